//! Return continuations
//!
//! The dispatch loop that drives continuations lives outside this crate; an
//! environment only needs to own the continuation it resumes when its call
//! completes.

use crate::value::Value;
use std::fmt;

type ResumeFn = dyn Fn(Value) -> Value + Send + Sync;

/// What to do with the value a call produces
pub struct Continuation {
    label: String,
    resume: Box<ResumeFn>,
}

impl Continuation {
    pub fn new<F>(label: impl Into<String>, resume: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            resume: Box::new(resume),
        }
    }

    /// Continuation that ends execution with the value it receives
    pub fn halt() -> Self {
        Self::new("halt", |value| value)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hand `value` to the rest of the computation
    pub fn resume(&self, value: Value) -> Value {
        (self.resume)(value)
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Continuation({})", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_passes_value_through() {
        let k = Continuation::halt();
        assert_eq!(k.resume(Value::Number(5.0)), Value::Number(5.0));
        assert_eq!(format!("{:?}", k), "Continuation(halt)");
    }

    #[test]
    fn test_custom_continuation() {
        let k = Continuation::new("double", |v| match v {
            Value::Number(n) => Value::Number(n * 2.0),
            other => other,
        });
        assert_eq!(k.resume(Value::Number(4.0)), Value::Number(8.0));
        assert_eq!(k.label(), "double");
    }
}
