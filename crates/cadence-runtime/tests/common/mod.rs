// Shared helpers for cadence-runtime integration tests
#![allow(dead_code)]

use cadence_runtime::{
    Continuation, Environment, FunctionCallEnv, HostEmbedding, InvokeError, Invoker,
    InvokerClass, InvokerSelector, SourceLocation, Value,
};
use std::sync::Arc;

pub fn loc(line: u32) -> SourceLocation {
    SourceLocation::new("main.cad", line)
}

pub fn embedding() -> Arc<dyn InvokerSelector> {
    Arc::new(HostEmbedding::locked_down())
}

/// Frame entered directly from the host
pub fn top_level(receiver: Value) -> FunctionCallEnv {
    FunctionCallEnv::new(embedding(), None, Continuation::halt(), loc(1), receiver)
}

/// Frame called from `caller`, one line further down
pub fn child_of(caller: &dyn Environment, receiver: Value) -> FunctionCallEnv {
    let line = caller.location().line + 1;
    FunctionCallEnv::new(
        embedding(),
        Some(caller),
        Continuation::halt(),
        loc(line),
        receiver,
    )
}

/// Invoker from outside the embedding, identified only by its class
#[derive(Debug)]
pub struct ForeignInvoker(pub InvokerClass);

impl Invoker for ForeignInvoker {
    fn class(&self) -> InvokerClass {
        self.0
    }

    fn method_call(&self, _: &Value, method: &str, _: &[Value]) -> Result<Value, InvokeError> {
        Err(InvokeError::Native(format!("foreign invoker called for {}", method)))
    }
}
