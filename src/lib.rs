pub use portloom_core::*;
pub use portloom_graph::*;
