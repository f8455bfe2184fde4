mod env;
mod error;
mod eval;
mod graph;
mod ids;
mod port_graph;
mod state;
mod subgraph;
mod view;

pub use env::EvaluationEnvironment;
pub use error::{EvalError, GraphError, StateError};
pub use eval::{BruteEvaluation, Evaluation, LazyEvaluation};
pub use graph::Graph;
pub use ids::{EdgeId, ExecutionId, IdAllocator, PortId, VertexId};
pub use port_graph::{PortDir, PortGraph, PortGraphConfig};
pub use state::{fingerprint, Fingerprint, WorkflowState};
pub use subgraph::SubPortGraph;
pub use view::PortGraphView;
