use portloom_core::Actor;

use crate::error::GraphError;
use crate::ids::{EdgeId, PortId, VertexId};

/// Read-only query surface shared by [`PortGraph`] and [`SubPortGraph`].
///
/// [`WorkflowState`] and the evaluation algorithms are generic over this
/// trait so they run unchanged against a full graph or a restricted view.
///
/// [`PortGraph`]: crate::PortGraph
/// [`SubPortGraph`]: crate::SubPortGraph
/// [`WorkflowState`]: crate::WorkflowState
pub trait PortGraphView {
    fn contains_vertex(&self, vid: VertexId) -> bool;

    /// Vertex ids in insertion order.
    fn vertices(&self) -> Vec<VertexId>;

    /// Edge ids in insertion order.
    fn edges(&self) -> Vec<EdgeId>;

    fn in_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError>;

    fn out_edges(&self, vid: VertexId) -> Result<Vec<EdgeId>, GraphError>;

    /// Distinct vertices with an edge into `vid`.
    fn in_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError>;

    /// Distinct vertices with an edge out of `vid`.
    fn out_neighbors(&self, vid: VertexId) -> Result<Vec<VertexId>, GraphError>;

    fn source(&self, eid: EdgeId) -> Result<VertexId, GraphError>;

    fn target(&self, eid: EdgeId) -> Result<VertexId, GraphError>;

    /// All port ids in the graph.
    fn ports(&self) -> Vec<PortId>;

    /// Ports owned by `vid`, in the order they were added.
    fn vertex_ports(&self, vid: VertexId) -> Result<Vec<PortId>, GraphError>;

    fn is_in_port(&self, pid: PortId) -> Result<bool, GraphError>;

    fn is_out_port(&self, pid: PortId) -> Result<bool, GraphError>;

    /// The vertex owning the port.
    fn port_vertex(&self, pid: PortId) -> Result<VertexId, GraphError>;

    /// The local key of the port within its vertex.
    fn port_key(&self, pid: PortId) -> Result<&str, GraphError>;

    /// Resolve a local input key on a vertex to its global port id.
    fn in_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError>;

    /// Resolve a local output key on a vertex to its global port id.
    fn out_port(&self, vid: VertexId, key: &str) -> Result<PortId, GraphError>;

    /// The output port an edge leaves from.
    fn source_port(&self, eid: EdgeId) -> Result<PortId, GraphError>;

    /// The input port an edge arrives at.
    fn target_port(&self, eid: EdgeId) -> Result<PortId, GraphError>;

    /// Edges attached to the port, respecting its direction.
    fn connected_edges(&self, pid: PortId) -> Result<Vec<EdgeId>, GraphError>;

    /// The actor attached to the vertex, if any.
    fn actor(&self, vid: VertexId) -> Result<Option<&dyn Actor>, GraphError>;

    /// Ports on the far end of every edge attached to `pid`.
    fn connected_ports(&self, pid: PortId) -> Result<Vec<PortId>, GraphError> {
        let outgoing = self.is_out_port(pid)?;
        let mut ports = Vec::new();
        for eid in self.connected_edges(pid)? {
            ports.push(if outgoing {
                self.target_port(eid)?
            } else {
                self.source_port(eid)?
            });
        }
        Ok(ports)
    }

    fn nb_vertices(&self) -> usize {
        self.vertices().len()
    }

    fn nb_edges(&self) -> usize {
        self.edges().len()
    }

    /// All input ports in the graph.
    fn in_ports(&self) -> Vec<PortId> {
        self.ports()
            .into_iter()
            .filter(|&pid| self.is_in_port(pid).unwrap_or(false))
            .collect()
    }

    /// All output ports in the graph.
    fn out_ports(&self) -> Vec<PortId> {
        self.ports()
            .into_iter()
            .filter(|&pid| self.is_out_port(pid).unwrap_or(false))
            .collect()
    }

    /// Input ports owned by `vid`.
    fn vertex_in_ports(&self, vid: VertexId) -> Result<Vec<PortId>, GraphError> {
        Ok(self
            .vertex_ports(vid)?
            .into_iter()
            .filter(|&pid| self.is_in_port(pid).unwrap_or(false))
            .collect())
    }

    /// Output ports owned by `vid`.
    fn vertex_out_ports(&self, vid: VertexId) -> Result<Vec<PortId>, GraphError> {
        Ok(self
            .vertex_ports(vid)?
            .into_iter()
            .filter(|&pid| self.is_out_port(pid).unwrap_or(false))
            .collect())
    }

    /// Number of edges attached to the port.
    fn nb_connections(&self, pid: PortId) -> Result<usize, GraphError> {
        Ok(self.connected_edges(pid)?.len())
    }

    fn nb_in_edges(&self, vid: VertexId) -> Result<usize, GraphError> {
        Ok(self.in_edges(vid)?.len())
    }

    fn nb_out_edges(&self, vid: VertexId) -> Result<usize, GraphError> {
        Ok(self.out_edges(vid)?.len())
    }

    /// Number of distinct vertices adjacent to `vid`, in either direction.
    fn nb_neighbors(&self, vid: VertexId) -> Result<usize, GraphError> {
        let mut neighbors = self.in_neighbors(vid)?;
        for nid in self.out_neighbors(vid)? {
            if !neighbors.contains(&nid) {
                neighbors.push(nid);
            }
        }
        Ok(neighbors.len())
    }
}
