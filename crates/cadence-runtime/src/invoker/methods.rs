//! Native method registration
//!
//! Host methods callable on receivers from interpreted code. Methods are keyed
//! by receiver type name (see [`Value::type_name`]) and method name, and are
//! shared by every invoker an embedding installs.
//!
//! # Examples
//!
//! ```rust
//! use cadence_runtime::invoker::{MethodTable, NativeMethodBuilder};
//! use cadence_runtime::Value;
//!
//! let mut table = MethodTable::new();
//! table.register(
//!     "Number",
//!     NativeMethodBuilder::new("plus")
//!         .with_arity(1)
//!         .with_implementation(|receiver, args| match (receiver, &args[0]) {
//!             (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
//!             _ => Ok(Value::Null),
//!         })
//!         .build()
//!         .unwrap(),
//! );
//!
//! let result = table.dispatch(&Value::Number(2.0), "plus", &[Value::Number(3.0)]);
//! assert_eq!(result, Ok(Value::Number(5.0)));
//! ```

use super::InvokeError;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for native method implementation
type NativeMethodImpl = Box<dyn Fn(&Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// A host method with optional arity validation
pub struct NativeMethod {
    name: String,
    arity: Option<usize>,
    implementation: NativeMethodImpl,
}

impl NativeMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed argument count, `None` when variadic
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Invoke the method, validating the argument count first
    pub fn call(&self, receiver: &Value, args: &[Value]) -> Result<Value, InvokeError> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(InvokeError::ArityMismatch {
                    receiver: receiver.type_name().to_string(),
                    method: self.name.clone(),
                    expected,
                    found: args.len(),
                });
            }
        }

        (self.implementation)(receiver, args)
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMethod")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Builder for constructing native methods with arity validation
pub struct NativeMethodBuilder {
    name: String,
    arity: Option<usize>,
    implementation: Option<NativeMethodImpl>,
}

impl NativeMethodBuilder {
    /// Create a new native method builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
            implementation: None,
        }
    }

    /// Set the method's arity (required argument count)
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Accept any number of arguments
    pub fn variadic(mut self) -> Self {
        self.arity = None;
        self
    }

    /// Set the method implementation
    ///
    /// For fixed-arity methods the argument count has already been validated
    /// when this closure is called.
    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.implementation = Some(Box::new(implementation));
        self
    }

    /// Build the native method
    ///
    /// Fails with [`InvokeError::Native`] if no implementation was provided.
    pub fn build(self) -> Result<NativeMethod, InvokeError> {
        let implementation = self.implementation.ok_or_else(|| {
            InvokeError::Native(format!("Native method '{}' has no implementation", self.name))
        })?;

        Ok(NativeMethod {
            name: self.name,
            arity: self.arity,
            implementation,
        })
    }
}

/// Host methods keyed by (receiver type, method name)
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: HashMap<String, HashMap<String, Arc<NativeMethod>>>,
}

impl MethodTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with core string and array methods, plus `toString` on built-in types
    pub fn with_core_methods() -> Self {
        let mut table = Self::new();
        table.register_core_methods();
        table
    }

    /// Register `method` for receivers whose type name is `receiver_type`
    ///
    /// Registering the same name again replaces the previous method.
    pub fn register(&mut self, receiver_type: &str, method: NativeMethod) {
        self.methods
            .entry(receiver_type.to_string())
            .or_default()
            .insert(method.name.clone(), Arc::new(method));
    }

    /// Find a method by receiver type and name
    pub fn lookup(&self, receiver_type: &str, method: &str) -> Option<&Arc<NativeMethod>> {
        self.methods.get(receiver_type)?.get(method)
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.methods.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up and call `method` on `receiver`
    pub fn dispatch(
        &self,
        receiver: &Value,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let receiver_type = receiver.type_name();
        let native = self
            .lookup(receiver_type, method)
            .ok_or_else(|| InvokeError::NoSuchMethod {
                receiver: receiver_type.to_string(),
                method: method.to_string(),
            })?;

        native.call(receiver, args)
    }

    fn register_core_methods(&mut self) {
        self.register_fixed("String", "length", 0, Self::string_length);
        self.register_fixed("String", "toUpperCase", 0, Self::string_upper);
        self.register_fixed("String", "trim", 0, Self::string_trim);

        self.register_fixed("Array", "size", 0, |receiver, _| match receiver {
            Value::Array(arr) => Ok(Value::Number(arr.len() as f64)),
            _ => Ok(Value::Null),
        });

        for receiver_type in ["Null", "Bool", "Number", "String", "Array"] {
            self.register_fixed(receiver_type, "toString", 0, |receiver, _| {
                Ok(Value::string(receiver.to_string()))
            });
        }
    }

    fn register_fixed<F>(&mut self, receiver_type: &str, name: &str, arity: usize, f: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.register(
            receiver_type,
            NativeMethod {
                name: name.to_string(),
                arity: Some(arity),
                implementation: Box::new(f),
            },
        );
    }

    fn string_length(receiver: &Value, _: &[Value]) -> Result<Value, InvokeError> {
        match receiver {
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            _ => Ok(Value::Null),
        }
    }

    fn string_upper(receiver: &Value, _: &[Value]) -> Result<Value, InvokeError> {
        match receiver {
            Value::String(s) => Ok(Value::string(s.to_uppercase())),
            _ => Ok(Value::Null),
        }
    }

    fn string_trim(receiver: &Value, _: &[Value]) -> Result<Value, InvokeError> {
        match receiver {
            Value::String(s) => Ok(Value::string(s.trim())),
            _ => Ok(Value::Null),
        }
    }
}
