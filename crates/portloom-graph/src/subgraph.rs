use ahash::AHashSet;

use portloom_core::Actor;

use crate::error::GraphError;
use crate::ids::{EdgeId, PortId, VertexId};
use crate::port_graph::PortGraph;
use crate::view::PortGraphView;

/// A read-only view of a [`PortGraph`] restricted to a set of vertices.
///
/// Only edges with both endpoints in the set are visible, and only the
/// ports of vertices in the set. Per-entity lookups (`port_key`,
/// `in_port`, `actor`, ...) mirror the master graph unfiltered. No
/// edition is possible through the view.
pub struct SubPortGraph<'g> {
    graph: &'g PortGraph,
    vids: AHashSet<VertexId>,
}

impl<'g> SubPortGraph<'g> {
    pub fn new(graph: &'g PortGraph, vids: impl IntoIterator<Item = VertexId>) -> Self {
        Self {
            graph,
            vids: vids.into_iter().collect(),
        }
    }

    /// View of every vertex transitively upstream of `root_pid`.
    ///
    /// `root_pid` must be an input port. The vertex owning `root_pid` is
    /// itself not part of the view.
    pub fn upstream(graph: &'g PortGraph, root_pid: PortId) -> Result<Self, GraphError> {
        if !graph.is_in_port(root_pid)? {
            return Err(GraphError::NotAnInput(root_pid));
        }

        let mut vids = AHashSet::new();
        let mut front = Vec::new();
        for pid in graph.connected_ports(root_pid)? {
            front.push(graph.port_vertex(pid)?);
        }
        while let Some(vid) = front.pop() {
            if vids.insert(vid) {
                for nid in graph.in_neighbors(vid)? {
                    if !vids.contains(&nid) {
                        front.push(nid);
                    }
                }
            }
        }

        Ok(Self { graph, vids })
    }

    pub fn has_vertex(&self, vid: VertexId) -> bool {
        self.vids.contains(&vid)
    }

    pub fn has_edge(&self, eid: EdgeId) -> bool {
        match (self.graph.source(eid), self.graph.target(eid)) {
            (Ok(source), Ok(target)) => {
                self.vids.contains(&source) && self.vids.contains(&target)
            }
            _ => false,
        }
    }

    pub fn has_port(&self, pid: PortId) -> bool {
        self.graph
            .port_vertex(pid)
            .map_or(false, |vid| self.vids.contains(&vid))
    }
}

impl PortGraphView for SubPortGraph<'_> {
    fn contains_vertex(&self, vid: VertexId) -> bool {
        self.has_vertex(vid)
    }

    fn vertices(&self) -> Vec<VertexId> {
        self.graph
            .vertices()
            .into_iter()
            .filter(|vid| self.vids.contains(vid))
            .collect()
    }

    fn edges(&self) -> Vec<EdgeId> {
        self.graph
            .edges()
            .into_iter()
            .filter(|&eid| self.has_edge(eid))
            .collect()
    }

    fn in_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError> {
        if !self.has_vertex(vid) {
            return Err(GraphError::VertexNotInView(vid));
        }
        Ok(self
            .graph
            .in_edges(vid)?
            .into_iter()
            .filter(|&eid| self.has_edge(eid))
            .collect())
    }

    fn out_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError> {
        if !self.has_vertex(vid) {
            return Err(GraphError::VertexNotInView(vid));
        }
        Ok(self
            .graph
            .out_edges(vid)?
            .into_iter()
            .filter(|&eid| self.has_edge(eid))
            .collect())
    }

    fn in_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.has_vertex(vid) {
            return Err(GraphError::VertexNotInView(vid));
        }
        Ok(self
            .graph
            .in_neighbors(vid)?
            .into_iter()
            .filter(|nid| self.vids.contains(nid))
            .collect())
    }

    fn out_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if !self.has_vertex(vid) {
            return Err(GraphError::VertexNotInView(vid));
        }
        Ok(self
            .graph
            .out_neighbors(vid)?
            .into_iter()
            .filter(|nid| self.vids.contains(nid))
            .collect())
    }

    fn source(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        if !self.has_edge(eid) {
            return Err(GraphError::EdgeNotInView(eid));
        }
        self.graph.source(eid)
    }

    fn target(&self, eid: EdgeId) -> Result<VertexId, GraphError> {
        if !self.has_edge(eid) {
            return Err(GraphError::EdgeNotInView(eid));
        }
        self.graph.target(eid)
    }

    fn ports(&self) -> Vec<PortId> {
        self.graph
            .ports()
            .into_iter()
            .filter(|&pid| self.has_port(pid))
            .collect()
    }

    fn vertex_ports(&self, vid: VertexId) -> Result<Vec<PortId>, GraphError> {
        if !self.has_vertex(vid) {
            return Err(GraphError::VertexNotInView(vid));
        }
        self.graph.vertex_ports(vid)
    }

    fn is_in_port(&self, pid: PortId) -> Result<bool, GraphError> {
        self.graph.is_in_port(pid)
    }

    fn is_out_port(&self, pid: PortId) -> Result<bool, GraphError> {
        self.graph.is_out_port(pid)
    }

    fn port_vertex(&self, pid: PortId) -> Result<VertexId, GraphError> {
        self.graph.port_vertex(pid)
    }

    fn port_key(&self, pid: PortId) -> Result<&str, GraphError> {
        self.graph.port_key(pid)
    }

    fn in_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError> {
        self.graph.in_port(vid, key)
    }

    fn out_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError> {
        self.graph.out_port(vid, key)
    }

    fn source_port(&self, eid: EdgeId) -> Result<PortId, GraphError> {
        if !self.has_edge(eid) {
            return Err(GraphError::EdgeNotInView(eid));
        }
        self.graph.source_port(eid)
    }

    fn target_port(&self, eid: EdgeId) -> Result<PortId, GraphError> {
        if !self.has_edge(eid) {
            return Err(GraphError::EdgeNotInView(eid));
        }
        self.graph.target_port(eid)
    }

    fn connected_edges(&self, pid: PortId) -> Result<Vec<EdgeId>, GraphError> {
        if !self.has_port(pid) {
            return Err(GraphError::PortNotInView(pid));
        }
        Ok(self
            .graph
            .connected_edges(pid)?
            .into_iter()
            .filter(|&eid| self.has_edge(eid))
            .collect())
    }

    fn actor(&self, vid: VertexId) -> Result<Option<&dyn Actor>, GraphError> {
        self.graph.actor(vid)
    }
}
