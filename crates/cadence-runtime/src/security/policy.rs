//! Sandbox call policy definition and enforcement

use cadence_config::SandboxConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Call policy errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Policy parse error: {0}")]
    ParseError(String),

    #[error("Policy validation error: {0}")]
    ValidationError(String),

    #[error("Invalid policy field: {field} - {reason}")]
    InvalidField { field: String, reason: String },
}

/// Which method calls a restricted invoker may dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPolicy {
    /// Policy name/identifier
    pub name: String,

    /// Action when no rule matches
    #[serde(default = "default_deny")]
    pub default_action: PolicyAction,

    /// Allow rules
    #[serde(default)]
    pub allow: Vec<CallRule>,

    /// Deny rules (higher priority than allow)
    #[serde(default)]
    pub deny: Vec<CallRule>,
}

fn default_deny() -> PolicyAction {
    PolicyAction::Deny
}

/// Policy action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Deny,
}

/// Rule matching a `receiver.method` call
///
/// Patterns are `*` (anything), `prefix*` (starts with), or an exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRule {
    pub receiver: String,
    pub method: String,
}

impl CallRule {
    pub fn new(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            method: method.into(),
        }
    }

    /// Check whether this rule covers `receiver.method`
    pub fn matches(&self, receiver: &str, method: &str) -> bool {
        pattern_matches(&self.receiver, receiver) && pattern_matches(&self.method, method)
    }
}

fn pattern_matches(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

impl CallPolicy {
    /// Create new empty policy with default-deny
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_action: PolicyAction::Deny,
            allow: Vec::new(),
            deny: Vec::new(),
        }
    }

    /// Policy that allows every call (still audited by restricted invokers)
    pub fn allow_all(name: impl Into<String>) -> Self {
        Self {
            default_action: PolicyAction::Allow,
            ..Self::new(name)
        }
    }

    /// Builder-style allow rule
    pub fn allowing(mut self, receiver: &str, method: &str) -> Self {
        self.allow.push(CallRule::new(receiver, method));
        self
    }

    /// Builder-style deny rule
    pub fn denying(mut self, receiver: &str, method: &str) -> Self {
        self.deny.push(CallRule::new(receiver, method));
        self
    }

    /// Load policy from TOML string
    pub fn from_toml(content: &str) -> Result<Self, PolicyError> {
        let policy: Self =
            toml::from_str(content).map_err(|e| PolicyError::ParseError(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Build a policy from the `[sandbox]` configuration section
    pub fn from_config(
        name: impl Into<String>,
        config: &SandboxConfig,
    ) -> Result<Self, PolicyError> {
        let default_action = match config.default_action() {
            "allow" => PolicyAction::Allow,
            "deny" => PolicyAction::Deny,
            other => {
                return Err(PolicyError::InvalidField {
                    field: "default_action".to_string(),
                    reason: format!("expected 'allow' or 'deny', got '{}'", other),
                })
            }
        };

        let policy = Self {
            name: name.into(),
            default_action,
            allow: config
                .allow
                .iter()
                .map(|r| CallRule::new(&r.receiver, &r.method))
                .collect(),
            deny: config
                .deny
                .iter()
                .map(|r| CallRule::new(&r.receiver, &r.method))
                .collect(),
        };

        policy.validate()?;
        Ok(policy)
    }

    /// Validate policy
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.name.is_empty() {
            return Err(PolicyError::ValidationError(
                "Policy name cannot be empty".to_string(),
            ));
        }

        for rule in self.allow.iter().chain(&self.deny) {
            if rule.receiver.is_empty() || rule.method.is_empty() {
                return Err(PolicyError::InvalidField {
                    field: "pattern".to_string(),
                    reason: "Pattern cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Decide whether `receiver.method` may be dispatched
    ///
    /// Deny rules are checked first, then allow rules, then the default action.
    /// `receiver` is a type name (see [`Value::type_name`](crate::Value::type_name)),
    /// so host objects are matched by their class name.
    pub fn permits(&self, receiver: &str, method: &str) -> bool {
        if self.deny.iter().any(|r| r.matches(receiver, method)) {
            return false;
        }

        if self.allow.iter().any(|r| r.matches(receiver, method)) {
            return true;
        }

        self.default_action == PolicyAction::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_config::RuleConfig;

    #[test]
    fn test_default_denies() {
        let policy = CallPolicy::new("empty");
        assert!(!policy.permits("String", "length"));
    }

    #[test]
    fn test_exact_and_wildcard_rules() {
        let policy = CallPolicy::new("strings")
            .allowing("String", "*")
            .allowing("Array", "size");

        assert!(policy.permits("String", "toUpperCase"));
        assert!(policy.permits("Array", "size"));
        assert!(!policy.permits("Array", "clear"));
    }

    #[test]
    fn test_prefix_pattern() {
        let rule = CallRule::new("*", "get*");
        assert!(rule.matches("Script", "getName"));
        assert!(rule.matches("Script", "get"));
        assert!(!rule.matches("Script", "setName"));
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let policy = CallPolicy::allow_all("mostly-open")
            .allowing("Script", "exec")
            .denying("*", "exec*");

        assert!(!policy.permits("Script", "exec"));
        assert!(policy.permits("Script", "run"));
    }

    #[test]
    fn test_from_toml() {
        let policy = CallPolicy::from_toml(
            r#"
name = "pipeline"
default_action = "deny"

[[allow]]
receiver = "String"
method = "*"

[[deny]]
receiver = "String"
method = "execute"
"#,
        )
        .unwrap();

        assert_eq!(policy.name, "pipeline");
        assert!(policy.permits("String", "trim"));
        assert!(!policy.permits("String", "execute"));
    }

    #[test]
    fn test_from_toml_defaults_to_deny() {
        let policy = CallPolicy::from_toml(r#"name = "bare""#).unwrap();
        assert_eq!(policy.default_action, PolicyAction::Deny);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(matches!(
            CallPolicy::from_toml("name = "),
            Err(PolicyError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_name_and_pattern() {
        assert!(CallPolicy::new("").validate().is_err());
        assert!(CallPolicy::new("p").allowing("", "x").validate().is_err());
    }

    #[test]
    fn test_from_config() {
        let config = SandboxConfig {
            default_action: Some("allow".to_string()),
            deny: vec![RuleConfig::new("*", "exit")],
            ..Default::default()
        };

        let policy = CallPolicy::from_config("project", &config).unwrap();
        assert_eq!(policy.default_action, PolicyAction::Allow);
        assert!(!policy.permits("System", "exit"));
        assert!(policy.permits("System", "currentTimeMillis"));
    }

    #[test]
    fn test_from_config_rejects_unknown_action() {
        let config = SandboxConfig {
            default_action: Some("prompt".to_string()),
            ..Default::default()
        };

        assert!(CallPolicy::from_config("project", &config).is_err());
    }
}
