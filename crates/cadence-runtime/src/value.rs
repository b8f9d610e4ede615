//! Runtime value representation
//!
//! Values stored in call environments.
//! - Numbers, Bools, Null: Immediate values
//! - Strings: Heap-allocated, reference-counted (Arc<String>), immutable
//! - Arrays: Copy-on-write (ValueArray wrapping Arc<Vec<Value>>), value semantics
//! - Objects: Handles to host-owned objects, compared by identity
//!
//! `Null` doubles as "absent": reading an unbound local yields `Value::Null`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Copy-on-write array. Cheap to clone (refcount bump).
/// Mutations on a shared array clone the inner Vec first (Arc::make_mut).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn new() -> Self {
        ValueArray(Arc::new(Vec::new()))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Mutating access; copies the elements first if they are shared.
    pub fn push(&mut self, value: Value) {
        Arc::make_mut(&mut self.0).push(value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ValueArray(Arc::new(iter.into_iter().collect()))
    }
}

/// Handle to an object owned by the host (script instances, receivers).
///
/// Two handles are equal when they name the same object id.
///
/// The class name is the receiver type used for method lookup and sandbox
/// checks, and shares one namespace with the built-in type names. A host
/// class named `String` or `Array` is matched by rules written for those
/// built-ins, so hosts should not register classes under them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    class: Arc<str>,
    id: u64,
}

impl ObjectRef {
    pub fn new(class: &str, id: u64) -> Self {
        Self {
            class: Arc::from(class),
            id,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Runtime value
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Null / absent
    #[default]
    Null,
    Bool(bool),
    Number(#[serde(with = "number_repr")] f64),
    String(Arc<String>),
    Array(ValueArray),
    Object(ObjectRef),
}

/// Serde form of numbers. JSON has no literal for NaN or the infinities, so
/// those are written as the strings `"NaN"`, `"inf"` and `"-inf"`.
mod number_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Finite(f64),
        Named(String),
    }

    pub fn serialize<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if n.is_nan() {
            serializer.serialize_str("NaN")
        } else if n.is_infinite() {
            serializer.serialize_str(if *n > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*n)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Finite(n) => Ok(n),
            Repr::Named(name) => match name.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid number '{}'", other))),
            },
        }
    }
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create an object handle value
    pub fn object(class: &str, id: u64) -> Self {
        Value::Object(ObjectRef::new(class, id))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Receiver type name used for method lookup and policy checks.
    /// Objects report their class name as is.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(obj) => obj.class(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, elem) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => write!(f, "{}@{}", obj.class(), obj.id()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::new(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(ValueArray::from(v))
    }
}
