use std::fmt;

use crate::{Actor, ActorError, Value};

/// An [`Actor`] backed by a plain function or closure.
///
/// Port keys are declared explicitly with [`with_input`](Self::with_input)
/// and [`with_output`](Self::with_output); their declaration order is the
/// order values are passed to and expected back from the function.
///
/// ```
/// use portloom_core::{Actor, FnActor, Value};
///
/// let double = FnActor::new("demo:double", |inputs| {
///     let n = *inputs[0].downcast_ref::<i64>().unwrap();
///     Ok(vec![Value::new(n * 2)])
/// })
/// .with_input("n")
/// .with_output("n");
///
/// let out = double.invoke(&[Value::new(21_i64)]).unwrap();
/// assert_eq!(out[0].downcast_ref::<i64>(), Some(&42));
/// ```
pub struct FnActor {
    id: String,
    caption: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    lazy: bool,
    priority: i32,
    func: Box<dyn Fn(&[Value]) -> Result<Vec<Value>, ActorError>>,
}

impl FnActor {
    pub fn new(
        id: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Vec<Value>, ActorError> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            caption: String::from("caption"),
            inputs: Vec::new(),
            outputs: Vec::new(),
            lazy: true,
            priority: 0,
            func: Box::new(func),
        }
    }

    /// Declare the next input port key.
    pub fn with_input(mut self, key: impl Into<String>) -> Self {
        self.inputs.push(key.into());
        self
    }

    /// Declare the next output port key.
    pub fn with_output(mut self, key: impl Into<String>) -> Self {
        self.outputs.push(key.into());
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Free text label attached to this actor.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    /// Allow or forbid lazy evaluation of this actor.
    pub fn set_lazy(&mut self, lazy: bool) {
        self.lazy = lazy;
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }
}

impl Actor for FnActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn invoke(&self, inputs: &[Value]) -> Result<Vec<Value>, ActorError> {
        (self.func)(inputs)
    }

    fn is_lazy(&self) -> bool {
        self.lazy
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

impl fmt::Debug for FnActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnActor")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("lazy", &self.lazy)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
