use std::error::Error;

use downcast_rs::{impl_downcast, Downcast};

use crate::Value;

/// The error type actors report from [`Actor::invoke`].
pub type ActorError = Box<dyn Error>;

/// A user supplied computation attached to a vertex of a port graph.
///
/// An actor declares the local keys of its input and output ports and a
/// way to run the computation. The engine treats `invoke` as pure over
/// its inputs: outputs are the only effect that matters for freshness.
///
/// Actors must not touch the port graph or the workflow state while
/// being invoked; they only see their input values.
pub trait Actor: 'static + Downcast {
    /// Identifier of this actor implementation.
    ///
    /// By convention `"module:name"`. The engine preserves it but never
    /// interprets it.
    fn id(&self) -> &str;

    /// Ordered local keys of the input ports.
    fn inputs(&self) -> &[String];

    /// Ordered local keys of the output ports.
    fn outputs(&self) -> &[String];

    /// Run the computation.
    ///
    /// `inputs` holds one value per key of [`inputs`](Actor::inputs), in
    /// order. The result must hold one value per key of
    /// [`outputs`](Actor::outputs), in order; an actor with no outputs
    /// returns an empty vec.
    fn invoke(&self, inputs: &[Value]) -> Result<Vec<Value>, ActorError>;

    /// Whether the engine may skip this actor when its inputs have not
    /// changed since it last ran.
    fn is_lazy(&self) -> bool {
        true
    }

    /// Leaves with a higher priority are evaluated first.
    fn priority(&self) -> i32 {
        0
    }

    /// Restore the initial computational state of this actor.
    ///
    /// The engine never calls this; it is a hook for host code.
    fn reset(&mut self) {}
}

impl_downcast!(Actor);
