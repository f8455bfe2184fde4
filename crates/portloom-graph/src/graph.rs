use ahash::AHashMap;
use smallvec::SmallVec;

use crate::error::GraphError;
use crate::ids::{EdgeId, IdAllocator, VertexId};

struct VertexEntry<V> {
    weight: V,
    /// Edges pointing at this vertex.
    incoming: SmallVec<[EdgeId; 4]>,
    /// Edges leaving this vertex.
    outgoing: SmallVec<[EdgeId; 4]>,
}

struct EdgeEntry<E> {
    weight: E,
    source: VertexId,
    target: VertexId,
}

/// An untyped directed multigraph.
///
/// Per-vertex and per-edge attributes are the `V` and `E` weights. The
/// graph owns flat tables keyed by id; everything else refers to entries
/// by id only, so no entry ever points back into the graph.
///
/// `vertices()` and `edges()` iterate in insertion order.
pub struct Graph<V, E> {
    vertices: AHashMap<VertexId, VertexEntry<V>>,
    edges: AHashMap<EdgeId, EdgeEntry<E>>,
    vertex_order: Vec<VertexId>,
    edge_order: Vec<EdgeId>,
    vid_alloc: IdAllocator,
    eid_alloc: IdAllocator,
}

impl<V, E> Graph<V, E> {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: AHashMap::with_capacity(vertices),
            edges: AHashMap::with_capacity(edges),
            vertex_order: Vec::with_capacity(vertices),
            edge_order: Vec::with_capacity(edges),
            vid_alloc: IdAllocator::new(),
            eid_alloc: IdAllocator::new(),
        }
    }

    fn vertex(&self, vid: VertexId) -> Result<&VertexEntry<V>, GraphError> {
        self.vertices
            .get(&vid)
            .ok_or(GraphError::VertexNotFound(vid))
    }

    fn edge(&self, eid: EdgeId) -> Result<&EdgeEntry<E>, GraphError> {
        self.edges.get(&eid).ok_or(GraphError::EdgeNotFound(eid))
    }

    pub fn nb_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_vertex(&self, vid: VertexId) -> bool {
        self.vertices.contains_key(&vid)
    }

    pub fn contains_edge(&self, eid: EdgeId) -> bool {
        self.edges.contains_key(&eid)
    }

    /// Vertex ids in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_order.iter().copied()
    }

    /// Edge ids in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_order.iter().copied()
    }

    pub fn source(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        Ok(self.edge(eid)?.source)
    }

    pub fn target(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        Ok(self.edge(eid)?.target)
    }

    pub fn in_edges(&self, vid: VertexId) -> Result<&[EdgeId], GraphError> {
        Ok(&self.vertex(vid)?.incoming)
    }

    pub fn out_edges(&self, vid: VertexId) -> Result<&[EdgeId], GraphError> {
        Ok(&self.vertex(vid)?.outgoing)
    }

    /// Distinct vertices with an edge into `vid`, in edge insertion order.
    pub fn in_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        let entry = self.vertex(vid)?;
        let mut neighbors = Vec::with_capacity(entry.incoming.len());
        for eid in &entry.incoming {
            let source = self.edge(*eid)?.source;
            if !neighbors.contains(&source) {
                neighbors.push(source);
            }
        }
        Ok(neighbors)
    }

    /// Distinct vertices with an edge out of `vid`, in edge insertion order.
    pub fn out_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        let entry = self.vertex(vid)?;
        let mut neighbors = Vec::with_capacity(entry.outgoing.len());
        for eid in &entry.outgoing {
            let target = self.edge(*eid)?.target;
            if !neighbors.contains(&target) {
                neighbors.push(target);
            }
        }
        Ok(neighbors)
    }

    pub fn vertex_weight(&self, vid: VertexId) -> Result<&V, GraphError> {
        Ok(&self.vertex(vid)?.weight)
    }

    pub fn vertex_weight_mut(&mut self, vid: VertexId) -> Result<&mut V, GraphError> {
        Ok(&mut self
            .vertices
            .get_mut(&vid)
            .ok_or(GraphError::VertexNotFound(vid))?
            .weight)
    }

    pub fn edge_weight(&self, eid: EdgeId) -> Result<&E, GraphError> {
        Ok(&self.edge(eid)?.weight)
    }

    pub fn edge_weight_mut(&mut self, eid: EdgeId) -> Result<&mut E, GraphError> {
        Ok(&mut self
            .edges
            .get_mut(&eid)
            .ok_or(GraphError::EdgeNotFound(eid))?
            .weight)
    }

    /// Add a vertex, with the given id or a freshly minted one.
    pub fn add_vertex(&mut self, vid: Option<VertexId>, weight: V) -> Result<VertexId, GraphError> {
        let vid = match vid {
            Some(vid) => {
                if self.vid_alloc.take(Some(vid.0)).is_none() {
                    return Err(GraphError::VertexInUse(vid));
                }
                vid
            }
            None => VertexId(self.vid_alloc.take_fresh()),
        };
        self.vertices.insert(
            vid,
            VertexEntry {
                weight,
                incoming: SmallVec::new(),
                outgoing: SmallVec::new(),
            },
        );
        self.vertex_order.push(vid);
        Ok(vid)
    }

    /// Remove a vertex together with every edge touching it.
    ///
    /// Returns the vertex weight and the ids of the removed edges.
    pub fn remove_vertex(&mut self, vid: VertexId) -> Result<(V, Vec<EdgeId>), GraphError> {
        let entry = self.vertex(vid)?;
        let mut touching: Vec<EdgeId> = Vec::with_capacity(entry.incoming.len() + entry.outgoing.len());
        for eid in entry.incoming.iter().chain(&entry.outgoing) {
            if !touching.contains(eid) {
                touching.push(*eid);
            }
        }
        for eid in &touching {
            self.remove_edge(*eid)?;
        }

        let entry = self
            .vertices
            .remove(&vid)
            .ok_or(GraphError::VertexNotFound(vid))?;
        self.vertex_order.retain(|&v| v != vid);
        self.vid_alloc.release(vid.0);
        Ok((entry.weight, touching))
    }

    /// Add an edge, with the given id or a freshly minted one.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        eid: Option<EdgeId>,
        weight: E,
    ) -> Result<EdgeId, GraphError> {
        if !self.contains_vertex(source) {
            return Err(GraphError::VertexNotFound(source));
        }
        if !self.contains_vertex(target) {
            return Err(GraphError::VertexNotFound(target));
        }
        let eid = match eid {
            Some(eid) => {
                if self.eid_alloc.take(Some(eid.0)).is_none() {
                    return Err(GraphError::EdgeInUse(eid));
                }
                eid
            }
            None => EdgeId(self.eid_alloc.take_fresh()),
        };
        self.edges.insert(
            eid,
            EdgeEntry {
                weight,
                source,
                target,
            },
        );
        self.edge_order.push(eid);
        if let Some(entry) = self.vertices.get_mut(&source) {
            entry.outgoing.push(eid);
        }
        if let Some(entry) = self.vertices.get_mut(&target) {
            entry.incoming.push(eid);
        }
        Ok(eid)
    }

    /// Remove an edge, returning its weight.
    pub fn remove_edge(&mut self, eid: EdgeId) -> Result<E, GraphError> {
        let entry = self.edges.remove(&eid).ok_or(GraphError::EdgeNotFound(eid))?;
        if let Some(vertex) = self.vertices.get_mut(&entry.source) {
            vertex.outgoing.retain(|e| *e != eid);
        }
        if let Some(vertex) = self.vertices.get_mut(&entry.target) {
            vertex.incoming.retain(|e| *e != eid);
        }
        self.edge_order.retain(|&e| e != eid);
        self.eid_alloc.release(eid.0);
        Ok(entry.weight)
    }

    /// Drop every vertex and edge and reset both id allocators.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.vertex_order.clear();
        self.edge_order.clear();
        self.vid_alloc.clear();
        self.eid_alloc.clear();
    }
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
