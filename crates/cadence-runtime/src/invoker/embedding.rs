//! Reference embedding
//!
//! Supplies the two concrete invokers environments install: a
//! [`DefaultInvoker`] for unrestricted frames and a [`SandboxInvoker`] for
//! restricted ones. Every installation builds a fresh instance; the method
//! table, policy and audit logger are shared between them.

use super::{DefaultInvoker, Invoker, InvokerClass, InvokerSelector, MethodTable, SandboxInvoker};
use crate::continuation::Continuation;
use crate::env::{Environment, FunctionCallEnv};
use crate::location::SourceLocation;
use crate::security::{
    AuditEvent, AuditLogger, CallPolicy, MemoryAuditLogger, NullAuditLogger, PolicyError,
};
use crate::value::Value;
use cadence_config::Config;
use std::sync::Arc;

/// Host-side invoker selection
#[derive(Debug, Clone)]
pub struct HostEmbedding {
    methods: Arc<MethodTable>,
    policy: Arc<CallPolicy>,
    audit: Arc<dyn AuditLogger>,
    local_capacity: usize,
}

impl HostEmbedding {
    /// Create an embedding with an explicit policy and audit logger
    pub fn new(methods: MethodTable, policy: CallPolicy, audit: Arc<dyn AuditLogger>) -> Self {
        Self {
            methods: Arc::new(methods),
            policy: Arc::new(policy),
            audit,
            local_capacity: 0,
        }
    }

    /// Core methods, a deny-everything sandbox policy, no audit log
    pub fn locked_down() -> Self {
        Self::new(
            MethodTable::with_core_methods(),
            CallPolicy::new("default"),
            Arc::new(NullAuditLogger::new()),
        )
    }

    /// Build an embedding from loaded configuration
    ///
    /// The `[sandbox]` section provides the policy (named after the package,
    /// or "default"). When auditing is enabled a [`MemoryAuditLogger`] is used.
    /// `[runtime] local_capacity` becomes the hint used by [`HostEmbedding::enter`].
    pub fn from_config(config: &Config, methods: MethodTable) -> Result<Self, PolicyError> {
        let sandbox = config.sandbox();
        let name = config.package_name().unwrap_or("default");
        let policy = CallPolicy::from_config(name, &sandbox)?;

        let audit: Arc<dyn AuditLogger> = if sandbox.audit_enabled() {
            Arc::new(MemoryAuditLogger::new())
        } else {
            Arc::new(NullAuditLogger::new())
        };

        audit.log(AuditEvent::PolicyLoaded {
            name: policy.name.clone(),
            allow_rules: policy.allow.len(),
            deny_rules: policy.deny.len(),
        });

        Ok(Self {
            methods: Arc::new(methods),
            policy: Arc::new(policy),
            audit,
            local_capacity: config.local_capacity(),
        })
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn policy(&self) -> &CallPolicy {
        &self.policy
    }

    pub fn audit_log(&self) -> &Arc<dyn AuditLogger> {
        &self.audit
    }

    /// Expected local count for frames entered through this embedding
    pub fn local_capacity(&self) -> usize {
        self.local_capacity
    }

    /// Create a function call environment selecting invokers through this embedding
    pub fn enter(
        self: &Arc<Self>,
        caller: Option<&dyn Environment>,
        continuation: Continuation,
        location: SourceLocation,
        receiver: Value,
    ) -> FunctionCallEnv {
        let selector: Arc<dyn InvokerSelector> = self.clone();
        FunctionCallEnv::with_local_count(
            selector,
            caller,
            continuation,
            location,
            receiver,
            self.local_capacity,
        )
    }
}

impl InvokerSelector for HostEmbedding {
    fn install_for(&self, class: InvokerClass) -> Arc<dyn Invoker> {
        self.audit.log(AuditEvent::InvokerInstalled { class });

        match class {
            InvokerClass::Restricted => Arc::new(SandboxInvoker::new(
                Arc::clone(&self.methods),
                Arc::clone(&self.policy),
                Arc::clone(&self.audit),
            )),
            InvokerClass::Unrestricted => {
                Arc::new(DefaultInvoker::new(Arc::clone(&self.methods)))
            }
        }
    }
}
