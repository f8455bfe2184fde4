mod actor;
mod func;
mod value;

pub use actor::{Actor, ActorError};
pub use func::FnActor;
pub use value::Value;
