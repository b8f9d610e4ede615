//! Call environments
//!
//! An environment is the runtime record of one interpreted invocation. The
//! dispatch loop creates one per call and keeps it alive for as long as the
//! call's continuation chain (or a closure capturing it) can still run.
//!
//! - [`Environment`]: the contract every environment provides
//! - [`CallEnv`]: shared state of call environments (continuation, location,
//!   declared types, invoker, call-site trace)
//! - [`FunctionCallEnv`]: environment of a function or method call, owning
//!   its locals and applying the invoker-selection rule

mod function;
mod snapshot;
mod trace;

pub use function::{FunctionCallEnv, RECEIVER_KEY};
pub use snapshot::FrameSnapshot;
pub use trace::StackTrace;

use crate::continuation::Continuation;
use crate::invoker::Invoker;
use crate::location::SourceLocation;
use crate::types::{Type, TypeTable};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Non-local jumps resolved through environments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
}

impl fmt::Display for JumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpKind::Break => write!(f, "break"),
            JumpKind::Continue => write!(f, "continue"),
        }
    }
}

/// Jump resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JumpError {
    #[error("unexpected {kind} at {location}")]
    Unexpected {
        kind: JumpKind,
        label: Option<String>,
        location: SourceLocation,
    },
}

/// Contract of a call environment
pub trait Environment: fmt::Debug + Send {
    /// Continuation resumed when this call completes
    fn return_continuation(&self) -> &Continuation;

    /// Call site of this invocation
    fn location(&self) -> &SourceLocation;

    /// Declared types of local variables
    fn types(&self) -> &TypeTable;

    fn types_mut(&mut self) -> &mut TypeTable;

    /// Invoker dispatching calls made from this environment
    fn invoker(&self) -> &Arc<dyn Invoker>;

    /// Assign an invoker. Implementations decide what is actually installed.
    fn set_invoker(&mut self, incoming: Option<&dyn Invoker>);

    fn declare_variable(&mut self, ty: Type, name: &str);

    /// Current value of `name`, `Value::Null` if unbound
    fn local_variable(&self, name: &str) -> Value;

    fn set_local_variable(&mut self, name: &str, value: Value);

    /// Receiver that closures created in this environment belong to
    fn closure_owner(&self) -> Value;

    /// Call sites from this environment outwards
    fn stack_trace(&self) -> &StackTrace;

    /// Continuation for a `break`/`continue`. Call environments are a
    /// boundary for both, so by default every jump is rejected.
    fn jump_target(&self, kind: JumpKind, label: Option<&str>) -> Result<&Continuation, JumpError> {
        Err(JumpError::Unexpected {
            kind,
            label: label.map(str::to_string),
            location: self.location().clone(),
        })
    }
}

/// State shared by every call environment
#[derive(Debug)]
pub struct CallEnv {
    continuation: Continuation,
    location: SourceLocation,
    types: TypeTable,
    invoker: Arc<dyn Invoker>,
    trace: StackTrace,
}

impl CallEnv {
    /// Build the shared part of a call environment
    ///
    /// `caller` is only read here, to extend its call-site trace; it is not
    /// retained. `local_count` sizes the type table.
    pub fn new(
        caller: Option<&dyn Environment>,
        continuation: Continuation,
        location: SourceLocation,
        local_count: usize,
        invoker: Arc<dyn Invoker>,
    ) -> Self {
        let trace = match caller {
            Some(caller) => caller.stack_trace().push(location.clone()),
            None => StackTrace::root(location.clone()),
        };

        Self {
            continuation,
            location,
            types: TypeTable::with_capacity(local_count),
            invoker,
            trace,
        }
    }

    pub fn return_continuation(&self) -> &Continuation {
        &self.continuation
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn invoker(&self) -> &Arc<dyn Invoker> {
        &self.invoker
    }

    pub fn stack_trace(&self) -> &StackTrace {
        &self.trace
    }

    /// Store an already-selected invoker
    pub(crate) fn install_invoker(&mut self, invoker: Arc<dyn Invoker>) {
        self.invoker = invoker;
    }

    pub(crate) fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }
}
