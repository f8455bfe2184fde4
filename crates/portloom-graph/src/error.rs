use std::error::Error;

use crate::ids::{EdgeId, PortId, VertexId};

/// An error raised by a port graph operation or query.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The given vertex is not in the graph.
    #[error("vertex {0:?} does not exist")]
    VertexNotFound(VertexId),
    /// The requested vertex id is already outstanding.
    #[error("vertex id {0:?} is already in use")]
    VertexInUse(VertexId),
    /// The vertex exists but is outside the queried view.
    #[error("vertex {0:?} is not in view")]
    VertexNotInView(VertexId),
    /// The given edge is not in the graph.
    #[error("edge {0:?} does not exist")]
    EdgeNotFound(EdgeId),
    /// The requested edge id is already outstanding.
    #[error("edge id {0:?} is already in use")]
    EdgeInUse(EdgeId),
    /// The edge exists but is outside the queried view.
    #[error("edge {0:?} is not in view")]
    EdgeNotInView(EdgeId),
    /// An edge between this exact port pair already exists.
    #[error("ports {from:?} and {target:?} are already connected")]
    DuplicateConnection { from: PortId, target: PortId },
    /// The connection would make the graph cyclic.
    #[error("connecting {from:?} to {target:?} would create a cycle")]
    WouldCycle { from: PortId, target: PortId },
    /// The given port is not in the graph.
    #[error("port {0:?} does not exist")]
    PortNotFound(PortId),
    /// The requested port id is already outstanding.
    #[error("port id {0:?} is already in use")]
    PortInUse(PortId),
    /// The port exists but is outside the queried view.
    #[error("port {0:?} is not in view")]
    PortNotInView(PortId),
    /// The vertex already owns a port with this local key and direction.
    #[error("vertex {vid:?} already has a port keyed '{key}' in that direction")]
    DuplicateKey { vid: VertexId, key: String },
    /// No port with this local key and direction on the vertex.
    #[error("vertex {vid:?} has no port keyed '{key}' in that direction")]
    KeyNotFound { vid: VertexId, key: String },
    /// An input port was given where an output port is required.
    #[error("port {0:?} is not an output port")]
    NotAnOutput(PortId),
    /// An output port was given where an input port is required.
    #[error("port {0:?} is not an input port")]
    NotAnInput(PortId),
    /// The vertex's local port keys differ from the actor's declared keys.
    #[error("ports of vertex {0:?} do not match the actor's declared keys")]
    ActorPortMismatch(VertexId),
}

/// An error raised by a workflow state operation.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// No value has been stored on this output port.
    #[error("no value stored on output port {0:?}")]
    MissingValue(PortId),
    /// No parameter has been stored on this input port.
    #[error("no parameter stored on input port {0:?}")]
    MissingParam(PortId),
    /// Values live on output ports only.
    #[error("values cannot be stored on input port {0:?}")]
    StoreOnInput(PortId),
    /// Parameters live on input ports only.
    #[error("parameters cannot be stored on output port {0:?}")]
    ParamOnOutput(PortId),
    /// Parameters live on unconnected ports only.
    #[error("parameters cannot be stored on connected input port {0:?}")]
    ParamOnConnected(PortId),
}

/// An error raised while evaluating a port graph.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Some unconnected input port has no parameter.
    #[error("state is not ready for evaluation")]
    StateNotReady,
    /// The vertex has no actor to invoke.
    #[error("vertex {0:?} has no actor")]
    MissingActor(VertexId),
    /// The actor returned the wrong number of values for its output ports.
    #[error("actor on vertex {vid:?} returned {got} values for {expected} output ports")]
    OutputArity {
        vid: VertexId,
        got: usize,
        expected: usize,
    },
    /// The actor's invocation itself failed.
    #[error("actor on vertex {vid:?} failed")]
    ActorFailed {
        vid: VertexId,
        #[source]
        source: Box<dyn Error>,
    },
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
