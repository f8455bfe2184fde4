use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;

use portloom_core::Actor;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::ids::{EdgeId, IdAllocator, PortId, VertexId};
use crate::view::PortGraphView;

/// Which side of a vertex a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDir {
    In,
    Out,
}

struct PortEntry {
    vertex: VertexId,
    key: String,
    dir: PortDir,
}

pub(crate) struct VertexData {
    ports: SmallVec<[PortId; 4]>,
    actor: Option<Box<dyn Actor>>,
}

pub(crate) struct EdgeData {
    source_port: PortId,
    target_port: PortId,
}

/// Tuning knobs for a new [`PortGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortGraphConfig {
    pub initial_vertex_capacity: usize,
    pub initial_edge_capacity: usize,
    pub initial_port_capacity: usize,
}

impl Default for PortGraphConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 64,
            initial_edge_capacity: 256,
            initial_port_capacity: 256,
        }
    }
}

/// A directed graph whose edges connect to named ports on vertices
/// instead of directly to the vertices.
///
/// Each vertex owns a set of input and output ports and at most one
/// [`Actor`]. Each edge records the exact output/input port pair it
/// connects, so several edges between the same vertex pair stay
/// distinguishable.
///
/// Edges are created with [`connect`](Self::connect) only; there is no
/// way to add an edge without naming its ports. Connections that would
/// make the graph cyclic are refused.
pub struct PortGraph {
    graph: Graph<VertexData, EdgeData>,
    ports: AHashMap<PortId, PortEntry>,
    pid_alloc: IdAllocator,
}

impl PortGraph {
    pub fn new() -> Self {
        Self::with_config(&PortGraphConfig::default())
    }

    pub fn with_config(config: &PortGraphConfig) -> Self {
        Self {
            graph: Graph::with_capacity(
                config.initial_vertex_capacity,
                config.initial_edge_capacity,
            ),
            ports: AHashMap::with_capacity(config.initial_port_capacity),
            pid_alloc: IdAllocator::new(),
        }
    }

    fn port(&self, pid: PortId) -> Result<&PortEntry, GraphError> {
        self.ports.get(&pid).ok_or(GraphError::PortNotFound(pid))
    }

    /// Create an empty vertex with no ports and no actor.
    pub fn add_vertex(&mut self, vid: Option<VertexId>) -> Result<VertexId, GraphError> {
        self.graph.add_vertex(
            vid,
            VertexData {
                ports: SmallVec::new(),
                actor: None,
            },
        )
    }

    /// Remove a vertex, its ports, and every edge touching them.
    pub fn remove_vertex(&mut self, vid: VertexId) -> Result<(), GraphError> {
        let pids: Vec<PortId> = self.graph.vertex_weight(vid)?.ports.to_vec();
        for pid in pids {
            self.remove_port(pid)?;
        }
        self.graph.remove_vertex(vid)?;
        Ok(())
    }

    fn add_port(
        &mut self,
        vid: VertexId,
        key: String,
        pid: Option<PortId>,
        dir: PortDir,
    ) -> Result<PortId, GraphError> {
        for other in &self.graph.vertex_weight(vid)?.ports {
            let entry = &self.ports[other];
            if entry.dir == dir && entry.key == key {
                return Err(GraphError::DuplicateKey { vid, key });
            }
        }
        let pid = match pid {
            Some(pid) => {
                if self.pid_alloc.take(Some(pid.0)).is_none() {
                    return Err(GraphError::PortInUse(pid));
                }
                pid
            }
            None => PortId(self.pid_alloc.take_fresh()),
        };
        self.ports.insert(
            pid,
            PortEntry {
                vertex: vid,
                key,
                dir,
            },
        );
        self.graph.vertex_weight_mut(vid)?.ports.push(pid);
        Ok(pid)
    }

    /// Add an input port to a vertex.
    ///
    /// The local key must be unique among the vertex's input ports.
    pub fn add_in_port(
        &mut self,
        vid: VertexId,
        key: impl Into<String>,
        pid: Option<PortId>,
    ) -> Result<PortId, GraphError> {
        self.add_port(vid, key.into(), pid, PortDir::In)
    }

    /// Add an output port to a vertex.
    ///
    /// The local key must be unique among the vertex's output ports.
    pub fn add_out_port(
        &mut self,
        vid: VertexId,
        key: impl Into<String>,
        pid: Option<PortId>,
    ) -> Result<PortId, GraphError> {
        self.add_port(vid, key.into(), pid, PortDir::Out)
    }

    /// Remove a port and every edge attached to it.
    pub fn remove_port(&mut self, pid: PortId) -> Result<(), GraphError> {
        let vid = self.port(pid)?.vertex;
        for eid in self.connected_edges(pid)? {
            self.graph.remove_edge(eid)?;
        }
        self.graph.vertex_weight_mut(vid)?.ports.retain(|p| *p != pid);
        self.ports.remove(&pid);
        self.pid_alloc.release(pid.0);
        Ok(())
    }

    /// Connect an output port to an input port.
    ///
    /// Refuses a second edge between the same port pair and any edge
    /// that would make the graph cyclic.
    pub fn connect(
        &mut self,
        source_pid: PortId,
        target_pid: PortId,
        eid: Option<EdgeId>,
    ) -> Result<EdgeId, GraphError> {
        let source = self.port(source_pid)?;
        if source.dir != PortDir::Out {
            return Err(GraphError::NotAnOutput(source_pid));
        }
        let source_vid = source.vertex;
        let target = self.port(target_pid)?;
        if target.dir != PortDir::In {
            return Err(GraphError::NotAnInput(target_pid));
        }
        let target_vid = target.vertex;

        for other in self.connected_edges(target_pid)? {
            if self.graph.edge_weight(other)?.source_port == source_pid {
                return Err(GraphError::DuplicateConnection {
                    from: source_pid,
                    target: target_pid,
                });
            }
        }

        if source_vid == target_vid || self.reaches(target_vid, source_vid)? {
            log::debug!(
                "refusing connection {:?} -> {:?}: would create a cycle",
                source_pid,
                target_pid
            );
            return Err(GraphError::WouldCycle {
                from: source_pid,
                target: target_pid,
            });
        }

        self.graph.add_edge(
            source_vid,
            target_vid,
            eid,
            EdgeData {
                source_port: source_pid,
                target_port: target_pid,
            },
        )
    }

    /// Whether `to` is reachable from `from` along edge direction.
    fn reaches(&self, from: VertexId, to: VertexId) -> Result<bool, GraphError> {
        let mut visited: AHashSet<VertexId> = AHashSet::new();
        let mut stack = vec![from];
        while let Some(vid) = stack.pop() {
            if vid == to {
                return Ok(true);
            }
            if visited.insert(vid) {
                stack.extend(self.graph.out_neighbors(vid)?);
            }
        }
        Ok(false)
    }

    /// Remove a single edge.
    pub fn disconnect(&mut self, eid: EdgeId) -> Result<(), GraphError> {
        self.graph.remove_edge(eid).map(|_| ())
    }

    /// Attach an actor to a vertex, or detach it with `None`.
    ///
    /// The vertex's local input keys must equal the actor's declared
    /// input keys as sets, and likewise for outputs. Declaration order
    /// plays no role here.
    pub fn set_actor(
        &mut self,
        vid: VertexId,
        actor: Option<Box<dyn Actor>>,
    ) -> Result<(), GraphError> {
        if let Some(actor) = &actor {
            let declared: AHashSet<&str> = actor.inputs().iter().map(String::as_str).collect();
            let mut present: AHashSet<&str> = AHashSet::new();
            for pid in self.vertex_in_ports(vid)? {
                present.insert(self.port(pid)?.key.as_str());
            }
            if declared != present {
                return Err(GraphError::ActorPortMismatch(vid));
            }

            let declared: AHashSet<&str> = actor.outputs().iter().map(String::as_str).collect();
            let mut present: AHashSet<&str> = AHashSet::new();
            for pid in self.vertex_out_ports(vid)? {
                present.insert(self.port(pid)?.key.as_str());
            }
            if declared != present {
                return Err(GraphError::ActorPortMismatch(vid));
            }
        }
        self.graph.vertex_weight_mut(vid)?.actor = actor;
        Ok(())
    }

    /// Mutable access to the actor attached to a vertex.
    ///
    /// Combine with `downcast_mut` to reconfigure a concrete actor in
    /// place.
    pub fn actor_mut(&mut self, vid: VertexId) -> Result<Option<&mut dyn Actor>, GraphError> {
        Ok(self.graph.vertex_weight_mut(vid)?.actor.as_deref_mut())
    }

    /// Create a vertex with one port per key the actor declares, then
    /// attach the actor.
    ///
    /// Input ports are created in `actor.inputs()` order, then output
    /// ports in `actor.outputs()` order. On any failure the partially
    /// created vertex is rolled back.
    pub fn add_actor(
        &mut self,
        actor: Box<dyn Actor>,
        vid: Option<VertexId>,
    ) -> Result<VertexId, GraphError> {
        let vid = self.add_vertex(vid)?;
        if let Err(e) = self.populate_actor(vid, actor) {
            let _ = self.remove_vertex(vid);
            return Err(e);
        }
        Ok(vid)
    }

    fn populate_actor(&mut self, vid: VertexId, actor: Box<dyn Actor>) -> Result<(), GraphError> {
        for key in actor.inputs() {
            self.add_in_port(vid, key.clone(), None)?;
        }
        for key in actor.outputs() {
            self.add_out_port(vid, key.clone(), None)?;
        }
        self.set_actor(vid, Some(actor))
    }

    /// Drop every vertex, edge, and port and reset all id allocators.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.ports.clear();
        self.pid_alloc.clear();
    }
}

impl Default for PortGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PortGraphView for PortGraph {
    fn contains_vertex(&self, vid: VertexId) -> bool {
        self.graph.contains_vertex(vid)
    }

    fn vertices(&self) -> Vec<VertexId> {
        self.graph.vertices().collect()
    }

    fn edges(&self) -> Vec<EdgeId> {
        self.graph.edges().collect()
    }

    fn in_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError> {
        Ok(self.graph.in_edges(vid)?.to_vec())
    }

    fn out_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError> {
        Ok(self.graph.out_edges(vid)?.to_vec())
    }

    fn in_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        self.graph.in_neighbors(vid)
    }

    fn out_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        self.graph.out_neighbors(vid)
    }

    fn source(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        self.graph.source(eid)
    }

    fn target(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        self.graph.target(eid)
    }

    fn ports(&self) -> Vec<PortId> {
        self.ports.keys().copied().collect()
    }

    fn vertex_ports(&self, vid: VertexId) -> Result<Vec<PortId>, GraphError> {
        Ok(self.graph.vertex_weight(vid)?.ports.to_vec())
    }

    fn is_in_port(&self, pid: PortId) -> Result<bool, GraphError> {
        Ok(self.port(pid)?.dir == PortDir::In)
    }

    fn is_out_port(&self, pid: PortId) -> Result<bool, GraphError> {
        Ok(self.port(pid)?.dir == PortDir::Out)
    }

    fn port_vertex(&self, pid: PortId) -> Result<VertexId, GraphError> {
        Ok(self.port(pid)?.vertex)
    }

    fn port_key(&self, pid: PortId) -> Result<&str, GraphError> {
        Ok(self.port(pid)?.key.as_str())
    }

    fn in_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError> {
        for pid in &self.graph.vertex_weight(vid)?.ports {
            let entry = &self.ports[pid];
            if entry.dir == PortDir::In && entry.key == key {
                return Ok(*pid);
            }
        }
        Err(GraphError::KeyNotFound {
            vid,
            key: key.to_owned(),
        })
    }

    fn out_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError> {
        for pid in &self.graph.vertex_weight(vid)?.ports {
            let entry = &self.ports[pid];
            if entry.dir == PortDir::Out && entry.key == key {
                return Ok(*pid);
            }
        }
        Err(GraphError::KeyNotFound {
            vid,
            key: key.to_owned(),
        })
    }

    fn source_port(&self, eid: EdgeId) -> Result<PortId, GraphError> {
        Ok(self.graph.edge_weight(eid)?.source_port)
    }

    fn target_port(&self, eid: EdgeId) -> Result<PortId, GraphError> {
        Ok(self.graph.edge_weight(eid)?.target_port)
    }

    fn connected_edges(&self, pid: PortId) -> Result<Vec<EdgeId>, GraphError> {
        let entry = self.port(pid)?;
        let mut eids = Vec::new();
        match entry.dir {
            PortDir::Out => {
                for eid in self.graph.out_edges(entry.vertex)? {
                    if self.graph.edge_weight(*eid)?.source_port == pid {
                        eids.push(*eid);
                    }
                }
            }
            PortDir::In => {
                for eid in self.graph.in_edges(entry.vertex)? {
                    if self.graph.edge_weight(*eid)?.target_port == pid {
                        eids.push(*eid);
                    }
                }
            }
        }
        Ok(eids)
    }

    fn actor(&self, vid: VertexId) -> Result<Option<&dyn Actor>, GraphError> {
        Ok(self.graph.vertex_weight(vid)?.actor.as_deref())
    }
}
