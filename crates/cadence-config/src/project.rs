//! Project Configuration (cadence.toml)
//!
//! Handles project-level configuration stored in `cadence.toml` at the project root.

use crate::sandbox::SandboxConfig;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from cadence.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageConfig>,

    /// Runtime tuning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeConfig>,

    /// Sandbox rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxConfig>,
}

/// Package metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// `X.Y` or `X.Y.Z`, optionally with a pre-release or build suffix
    pub version: String,
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Expected local count used when the interpreter has no better hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_capacity: Option<usize>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(pkg) = &self.package {
            if pkg.name.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "package.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }

            if !is_valid_version(&pkg.version) {
                return Err(ConfigError::InvalidValue {
                    field: "package.version".to_string(),
                    reason: format!("invalid version '{}'", pkg.version),
                });
            }
        }

        if let Some(sandbox) = &self.sandbox {
            sandbox.validate()?;
        }

        Ok(())
    }

    /// Get the package name, if present
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }

    /// Get the configured local capacity hint, if present
    pub fn local_capacity(&self) -> Option<usize> {
        self.runtime.as_ref().and_then(|r| r.local_capacity)
    }

    /// Get the sandbox section, creating an empty one if missing
    pub fn sandbox_mut(&mut self) -> &mut SandboxConfig {
        self.sandbox.get_or_insert_with(SandboxConfig::default)
    }
}

/// Basic semver validation (X.Y or X.Y.Z with optional pre-release/build suffix)
fn is_valid_version(version: &str) -> bool {
    let main_version = version.split(['-', '+']).next().unwrap_or("");

    let parts: Vec<&str> = main_version.split('.').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }

    parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
