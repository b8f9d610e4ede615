//! Sandbox policy and audit logging
//!
//! Restricted invokers consult a [`CallPolicy`] before dispatching a method
//! call and report every decision to an [`AuditLogger`].
//!
//! # Example
//!
//! ```
//! use cadence_runtime::security::CallPolicy;
//!
//! let policy = CallPolicy::new("untrusted")
//!     .allowing("String", "*")
//!     .denying("*", "exec*");
//!
//! assert!(policy.permits("String", "trim"));
//! assert!(!policy.permits("Script", "execute"));
//! ```

pub mod audit;
pub mod policy;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, MemoryAuditLogger, NullAuditLogger};
pub use policy::{CallPolicy, CallRule, PolicyAction, PolicyError};
