//! Invokers: how calls made from a call environment are dispatched
//!
//! Every environment holds exactly one invoker. Invokers come in two classes:
//! - **Unrestricted**: trusted code, calls go straight to the method table
//! - **Restricted**: sandboxed code, calls are checked against a policy first
//!
//! Environments never store an invoker handed to them. They ask their
//! [`InvokerSelector`] to classify it and install the embedding's own
//! implementation for that class, so an embedding controls the concrete
//! invokers without touching environment code.

mod default;
mod embedding;
mod methods;
mod sandbox;

pub use default::DefaultInvoker;
pub use embedding::HostEmbedding;
pub use methods::{MethodTable, NativeMethod, NativeMethodBuilder};
pub use sandbox::SandboxInvoker;

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The two invoker classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokerClass {
    Restricted,
    #[default]
    Unrestricted,
}

impl fmt::Display for InvokerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokerClass::Restricted => write!(f, "restricted"),
            InvokerClass::Unrestricted => write!(f, "unrestricted"),
        }
    }
}

/// Errors raised while dispatching a call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvokeError {
    #[error("No method '{method}' on {receiver}")]
    NoSuchMethod { receiver: String, method: String },

    #[error("Call to {receiver}.{method} rejected by sandbox policy '{policy}'")]
    Rejected {
        policy: String,
        receiver: String,
        method: String,
    },

    #[error("{receiver}.{method} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        receiver: String,
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Native(String),

    #[error("Recorded {0} invoker cannot dispatch calls")]
    Detached(InvokerClass),
}

/// Dispatches calls made from a call environment
pub trait Invoker: Send + Sync + fmt::Debug {
    /// Which class this invoker belongs to
    fn class(&self) -> InvokerClass;

    /// Call `method` on `receiver`
    fn method_call(&self, receiver: &Value, method: &str, args: &[Value])
        -> Result<Value, InvokeError>;
}

/// Embedding hook choosing the invoker an environment installs
pub trait InvokerSelector: Send + Sync + fmt::Debug {
    /// Classify an incoming invoker; `None` (no caller) is unrestricted
    fn classify(&self, incoming: Option<&dyn Invoker>) -> InvokerClass {
        incoming.map_or(InvokerClass::Unrestricted, |invoker| invoker.class())
    }

    /// Create this embedding's invoker for `class`
    fn install_for(&self, class: InvokerClass) -> Arc<dyn Invoker>;

    /// Classify `incoming` and install the matching invoker
    fn select(&self, incoming: Option<&dyn Invoker>) -> Arc<dyn Invoker> {
        self.install_for(self.classify(incoming))
    }
}

/// Stand-in carrying only a classification, used when a frame is rebuilt
/// from a snapshot. It is always replaced by the selector's own invoker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordedClass(pub(crate) InvokerClass);

impl Invoker for RecordedClass {
    fn class(&self) -> InvokerClass {
        self.0
    }

    fn method_call(&self, _: &Value, _: &str, _: &[Value]) -> Result<Value, InvokeError> {
        Err(InvokeError::Detached(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(InvokerClass);

    impl Invoker for Fixed {
        fn class(&self) -> InvokerClass {
            self.0
        }

        fn method_call(&self, _: &Value, _: &str, _: &[Value]) -> Result<Value, InvokeError> {
            Ok(Value::Null)
        }
    }

    #[derive(Debug)]
    struct FixedSelector;

    impl InvokerSelector for FixedSelector {
        fn install_for(&self, class: InvokerClass) -> Arc<dyn Invoker> {
            Arc::new(Fixed(class))
        }
    }

    #[test]
    fn test_default_classify() {
        let selector = FixedSelector;
        assert_eq!(selector.classify(None), InvokerClass::Unrestricted);
        assert_eq!(
            selector.classify(Some(&Fixed(InvokerClass::Restricted))),
            InvokerClass::Restricted
        );
    }

    #[test]
    fn test_select_installs_fresh_instance() {
        let selector = FixedSelector;
        let incoming: Arc<dyn Invoker> = Arc::new(Fixed(InvokerClass::Restricted));
        let installed = selector.select(Some(incoming.as_ref()));

        assert_eq!(installed.class(), InvokerClass::Restricted);
        assert!(!Arc::ptr_eq(&installed, &incoming));
    }

    #[test]
    fn test_recorded_class_cannot_dispatch() {
        let recorded = RecordedClass(InvokerClass::Restricted);
        assert_eq!(
            recorded.method_call(&Value::Null, "toString", &[]),
            Err(InvokeError::Detached(InvokerClass::Restricted))
        );
    }

    #[test]
    fn test_class_display_and_serde() {
        assert_eq!(InvokerClass::Restricted.to_string(), "restricted");
        assert_eq!(
            serde_json::to_string(&InvokerClass::Unrestricted).unwrap(),
            "\"unrestricted\""
        );
        assert_eq!(InvokerClass::default(), InvokerClass::Unrestricted);
    }
}
