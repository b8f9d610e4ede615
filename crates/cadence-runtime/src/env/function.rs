//! Function call environment

use super::{CallEnv, Environment, FrameSnapshot, StackTrace};
use crate::continuation::Continuation;
use crate::invoker::{Invoker, InvokerSelector, RecordedClass};
use crate::location::SourceLocation;
use crate::types::{Type, TypeTable};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Local name the receiver is bound under
pub const RECEIVER_KEY: &str = "this";

/// Capacity of `locals` when no locals are expected: the receiver plus one.
const MINIMAL_LOCALS_CAPACITY: usize = 2;

/// Environment of an ordinary function or method call
///
/// Holds the call's locals, with the receiver bound under [`RECEIVER_KEY`],
/// and installs its invoker through the embedding's [`InvokerSelector`]:
/// whatever invoker is assigned, only its class is kept.
#[derive(Debug)]
pub struct FunctionCallEnv {
    base: CallEnv,
    selector: Arc<dyn InvokerSelector>,
    locals: HashMap<String, Value>,
}

impl FunctionCallEnv {
    /// Environment for a call that declares no locals
    ///
    /// `caller` is `None` only for calls entering interpreted code from the host.
    pub fn new(
        selector: Arc<dyn InvokerSelector>,
        caller: Option<&dyn Environment>,
        continuation: Continuation,
        location: SourceLocation,
        receiver: Value,
    ) -> Self {
        Self::with_local_count(selector, caller, continuation, location, receiver, 0)
    }

    /// Environment for a call expected to declare `local_count` locals
    pub fn with_local_count(
        selector: Arc<dyn InvokerSelector>,
        caller: Option<&dyn Environment>,
        continuation: Continuation,
        location: SourceLocation,
        receiver: Value,
        local_count: usize,
    ) -> Self {
        let invoker = selector.select(caller.map(|c| c.invoker().as_ref()));
        let base = CallEnv::new(caller, continuation, location, local_count, invoker);

        let mut locals = if local_count == 0 {
            HashMap::with_capacity(MINIMAL_LOCALS_CAPACITY)
        } else {
            HashMap::with_capacity(local_count + 1)
        };
        locals.insert(RECEIVER_KEY.to_string(), receiver);

        Self {
            base,
            selector,
            locals,
        }
    }

    /// Rebuild a suspended frame from a snapshot
    ///
    /// The recorded invoker class goes through `selector` like any other
    /// assignment, so the frame ends up with the embedding's own invoker.
    pub fn restore(
        snapshot: FrameSnapshot,
        selector: Arc<dyn InvokerSelector>,
        continuation: Continuation,
    ) -> Self {
        let invoker = selector.select(Some(&RecordedClass(snapshot.invoker_class)));
        let mut base = CallEnv::new(
            None,
            continuation,
            snapshot.location,
            snapshot.types.len(),
            invoker,
        )
        .with_trace(StackTrace::from_locations(snapshot.trace));
        *base.types_mut() = snapshot.types;

        let mut locals = snapshot.locals;
        locals.entry(RECEIVER_KEY.to_string()).or_default();

        Self {
            base,
            selector,
            locals,
        }
    }

    /// Capture this frame's state for persistence
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            location: self.base.location().clone(),
            locals: self.locals.clone(),
            types: self.base.types().clone(),
            invoker_class: self.base.invoker().class(),
            trace: self.base.stack_trace().to_vec(),
        }
    }

    /// Whether `name` is bound, even to `Null`
    pub fn has_local(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    /// Declared type of `name`, if it was declared
    pub fn declared_type(&self, name: &str) -> Option<&Type> {
        self.base.types().get(name)
    }

    /// Names of all bound locals, including the receiver
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.locals.keys().map(String::as_str)
    }

    pub fn selector(&self) -> &Arc<dyn InvokerSelector> {
        &self.selector
    }
}

impl Environment for FunctionCallEnv {
    fn return_continuation(&self) -> &Continuation {
        self.base.return_continuation()
    }

    fn location(&self) -> &SourceLocation {
        self.base.location()
    }

    fn types(&self) -> &TypeTable {
        self.base.types()
    }

    fn types_mut(&mut self) -> &mut TypeTable {
        self.base.types_mut()
    }

    fn invoker(&self) -> &Arc<dyn Invoker> {
        self.base.invoker()
    }

    /// Classify `incoming` and install the selector's invoker for that class.
    /// The incoming instance itself is never stored.
    fn set_invoker(&mut self, incoming: Option<&dyn Invoker>) {
        let invoker = self.selector.select(incoming);
        self.base.install_invoker(invoker);
    }

    /// Bind `name` to `Null` and record its declared type
    fn declare_variable(&mut self, ty: Type, name: &str) {
        self.locals.insert(name.to_string(), Value::Null);
        self.base.types_mut().insert(name.to_string(), ty);
    }

    fn local_variable(&self, name: &str) -> Value {
        self.locals.get(name).cloned().unwrap_or_default()
    }

    fn set_local_variable(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    fn closure_owner(&self) -> Value {
        self.local_variable(RECEIVER_KEY)
    }

    fn stack_trace(&self) -> &StackTrace {
        self.base.stack_trace()
    }
}
