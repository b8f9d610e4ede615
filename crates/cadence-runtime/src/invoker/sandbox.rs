//! Restricted invoker

use super::{InvokeError, Invoker, InvokerClass, MethodTable};
use crate::security::{AuditEvent, AuditLogger, CallPolicy};
use crate::value::Value;
use std::sync::Arc;

/// Checks every call against a [`CallPolicy`] before dispatching it
///
/// Each check is reported to the audit logger; denied calls never reach the
/// method table.
#[derive(Debug, Clone)]
pub struct SandboxInvoker {
    methods: Arc<MethodTable>,
    policy: Arc<CallPolicy>,
    audit: Arc<dyn AuditLogger>,
}

impl SandboxInvoker {
    pub fn new(
        methods: Arc<MethodTable>,
        policy: Arc<CallPolicy>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            methods,
            policy,
            audit,
        }
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }
}

impl Invoker for SandboxInvoker {
    fn class(&self) -> InvokerClass {
        InvokerClass::Restricted
    }

    fn method_call(
        &self,
        receiver: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let receiver_type = receiver.type_name();
        let granted = self.policy.permits(receiver_type, method);

        self.audit.log(AuditEvent::CallChecked {
            receiver: receiver_type.to_string(),
            method: method.to_string(),
            granted,
        });

        if !granted {
            self.audit.log(AuditEvent::CallRejected {
                policy: self.policy.name.clone(),
                receiver: receiver_type.to_string(),
                method: method.to_string(),
            });
            return Err(InvokeError::Rejected {
                policy: self.policy.name.clone(),
                receiver: receiver_type.to_string(),
                method: method.to_string(),
            });
        }

        self.methods.dispatch(receiver, method, args)
    }
}
