//! Sandbox audit logging
//!
//! Provides structured logging of sandbox events (call checks, rejections,
//! invoker installation) for security monitoring.

use crate::invoker::InvokerClass;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sandbox audit event types
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEvent {
    /// A restricted invoker checked a call against its policy
    CallChecked {
        receiver: String,
        method: String,
        granted: bool,
    },
    /// A restricted invoker refused to dispatch a call
    CallRejected {
        policy: String,
        receiver: String,
        method: String,
    },
    /// An embedding installed an invoker on a call environment
    InvokerInstalled { class: InvokerClass },
    /// A call policy was built from configuration
    PolicyLoaded {
        name: String,
        allow_rules: usize,
        deny_rules: usize,
    },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::CallChecked {
                receiver,
                method,
                granted,
            } => {
                let status = if *granted { "GRANTED" } else { "DENIED" };
                write!(f, "Call {}: {}.{}", status, receiver, method)
            }
            AuditEvent::CallRejected {
                policy,
                receiver,
                method,
            } => {
                write!(
                    f,
                    "Call rejected by policy '{}': {}.{}",
                    policy, receiver, method
                )
            }
            AuditEvent::InvokerInstalled { class } => {
                write!(f, "Invoker installed: {}", class)
            }
            AuditEvent::PolicyLoaded {
                name,
                allow_rules,
                deny_rules,
            } => {
                write!(
                    f,
                    "Policy loaded: {} ({} allow, {} deny)",
                    name, allow_rules, deny_rules
                )
            }
        }
    }
}

/// Audit log entry with timestamp
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Event timestamp (Unix timestamp in milliseconds)
    pub timestamp: u64,
    /// Audit event
    pub event: AuditEvent,
}

impl AuditEntry {
    /// Create a new audit entry with current timestamp
    pub fn new(event: AuditEvent) -> Self {
        Self {
            timestamp: current_timestamp_ms(),
            event,
        }
    }

    /// Format as log line
    pub fn to_log_line(&self) -> String {
        format!(
            "[{}.{:03}] {}",
            self.timestamp / 1000,
            self.timestamp % 1000,
            self.event
        )
    }
}

/// Current Unix timestamp in milliseconds (0 if the clock is before the epoch)
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Audit logger trait for customizable logging backends
pub trait AuditLogger: Send + Sync + fmt::Debug {
    /// Log an audit event
    fn log(&self, event: AuditEvent);

    /// Get all logged entries
    fn entries(&self) -> Vec<AuditEntry>;

    /// Clear all logged entries
    fn clear(&self);
}

/// In-memory audit logger
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogger {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditLogger {
    /// Create a new in-memory audit logger
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer cannot leave a half-pushed entry behind, so a
    // poisoned log is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, event: AuditEvent) {
        self.lock().push(AuditEntry::new(event));
    }

    fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Null audit logger (no-op, for performance)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLogger;

impl NullAuditLogger {
    /// Create a new null audit logger
    pub fn new() -> Self {
        Self
    }
}

impl AuditLogger for NullAuditLogger {
    fn log(&self, _event: AuditEvent) {}

    fn entries(&self) -> Vec<AuditEntry> {
        Vec::new()
    }

    fn clear(&self) {}
}
