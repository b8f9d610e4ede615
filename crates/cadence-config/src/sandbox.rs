//! Sandbox section (`[sandbox]`)
//!
//! Shared by the project and global configuration files. Describes which
//! method calls a restricted invoker may dispatch and whether checks are audited.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// `[sandbox]` configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SandboxConfig {
    /// Record every sandbox check in the audit log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<bool>,

    /// Action when no rule matches ("allow" or "deny")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,

    /// Calls explicitly allowed
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<RuleConfig>,

    /// Calls explicitly denied (checked before `allow`)
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deny: Vec<RuleConfig>,
}

/// A single `{ receiver = "...", method = "..." }` rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Receiver type pattern (`*`, `Prefix*`, or exact name)
    pub receiver: String,

    /// Method name pattern (`*`, `prefix*`, or exact name)
    pub method: String,
}

impl RuleConfig {
    pub fn new(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            method: method.into(),
        }
    }
}

impl SandboxConfig {
    /// Validate the sandbox section
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(action) = &self.default_action {
            validate_action("sandbox.default_action", action)?;
        }

        for (list, rules) in [("sandbox.allow", &self.allow), ("sandbox.deny", &self.deny)] {
            for rule in rules {
                if rule.receiver.is_empty() || rule.method.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: list.to_string(),
                        reason: "receiver and method patterns cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Whether audit logging is enabled (default: false)
    pub fn audit_enabled(&self) -> bool {
        self.audit.unwrap_or(false)
    }

    /// Effective default action (default: "deny")
    pub fn default_action(&self) -> &str {
        self.default_action.as_deref().unwrap_or("deny")
    }

    /// Merge another sandbox section into this one
    /// Scalars from `other` win; rule lists are appended after ours
    pub fn merge(&mut self, other: &SandboxConfig) {
        if other.audit.is_some() {
            self.audit = other.audit;
        }
        if other.default_action.is_some() {
            self.default_action = other.default_action.clone();
        }
        self.allow.extend(other.allow.iter().cloned());
        self.deny.extend(other.deny.iter().cloned());
    }
}

/// Validate an allow/deny action value
pub(crate) fn validate_action(field: &str, value: &str) -> ConfigResult<()> {
    if !matches!(value, "allow" | "deny") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be 'allow' or 'deny', got '{}'", value),
        });
    }
    Ok(())
}
