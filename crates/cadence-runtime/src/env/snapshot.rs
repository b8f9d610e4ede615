//! Persisted form of a suspended function call environment

use crate::invoker::InvokerClass;
use crate::location::SourceLocation;
use crate::types::TypeTable;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serializable state of a [`FunctionCallEnv`](super::FunctionCallEnv)
///
/// Only the invoker's class is recorded. The continuation is not part of the
/// snapshot; the dispatch loop supplies it again on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub location: SourceLocation,
    pub locals: HashMap<String, Value>,
    pub types: TypeTable,
    pub invoker_class: InvokerClass,
    /// Call sites, innermost first
    pub trace: Vec<SourceLocation>,
}

impl FrameSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
