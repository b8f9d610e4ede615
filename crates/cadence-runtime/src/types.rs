//! Declared types recorded for local variables

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Mapping from variable name to declared type
pub type TypeTable = HashMap<String, Type>;

/// Type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Number type (unified int/float)
    Number,
    /// String type
    String,
    /// Boolean type
    Bool,
    /// Array type
    Array(Box<Type>),
    /// Host class, by name
    Class(String),
    /// Dynamically typed (`def x`)
    Dynamic,
}

impl Type {
    /// Shorthand for `Type::Class`
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Class(name) => write!(f, "{}", name),
            Type::Dynamic => write!(f, "dynamic"),
        }
    }
}
