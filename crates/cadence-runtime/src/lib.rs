//! Cadence Runtime - call environments for a resumable CPS interpreter
//!
//! This library provides the per-call state the interpreter's dispatch loop
//! works with:
//! - Call environments holding locals, declared types and the return continuation
//! - Invokers deciding how calls made from an environment are dispatched
//! - The embedding hook that picks restricted or unrestricted invokers
//! - Sandbox call policies and audit logging
//!
//! # Example
//!
//! ```
//! use cadence_runtime::{
//!     Continuation, Environment, FunctionCallEnv, HostEmbedding, InvokerClass,
//!     InvokerSelector, SourceLocation, Type, Value,
//! };
//! use std::sync::Arc;
//!
//! let embedding: Arc<dyn InvokerSelector> = Arc::new(HostEmbedding::locked_down());
//! let mut env = FunctionCallEnv::new(
//!     embedding,
//!     None,
//!     Continuation::halt(),
//!     SourceLocation::new("main.cad", 1),
//!     Value::object("Script", 1),
//! );
//!
//! env.declare_variable(Type::Number, "x");
//! env.set_local_variable("x", Value::Number(5.0));
//!
//! assert_eq!(env.local_variable("x"), Value::Number(5.0));
//! assert_eq!(env.closure_owner(), Value::object("Script", 1));
//! assert_eq!(env.invoker().class(), InvokerClass::Unrestricted);
//! ```

/// Cadence runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod continuation;
pub mod env;
pub mod invoker;
pub mod location;
pub mod security;
pub mod types;
pub mod value;

pub use continuation::Continuation;
pub use env::{
    CallEnv, Environment, FrameSnapshot, FunctionCallEnv, JumpError, JumpKind, StackTrace,
    RECEIVER_KEY,
};
pub use invoker::{
    DefaultInvoker, HostEmbedding, InvokeError, Invoker, InvokerClass, InvokerSelector,
    MethodTable, NativeMethod, NativeMethodBuilder, SandboxInvoker,
};
pub use location::SourceLocation;
pub use security::{AuditEvent, AuditLogger, CallPolicy, MemoryAuditLogger, NullAuditLogger};
pub use types::{Type, TypeTable};
pub use value::{ObjectRef, Value, ValueArray};
