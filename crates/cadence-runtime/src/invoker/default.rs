//! Unrestricted invoker

use super::{InvokeError, Invoker, InvokerClass, MethodTable};
use crate::value::Value;
use std::sync::Arc;

/// Dispatches calls straight to the method table
#[derive(Debug, Clone)]
pub struct DefaultInvoker {
    methods: Arc<MethodTable>,
}

impl DefaultInvoker {
    pub fn new(methods: Arc<MethodTable>) -> Self {
        Self { methods }
    }
}

impl Invoker for DefaultInvoker {
    fn class(&self) -> InvokerClass {
        InvokerClass::Unrestricted
    }

    fn method_call(
        &self,
        receiver: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        self.methods.dispatch(receiver, method, args)
    }
}
