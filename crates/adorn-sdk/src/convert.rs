//! Conversions between Rust values and [`Value`].
//!
//! `From` impls build values; the `as_*` accessors borrow the payload when
//! the variant matches and the `expect_*` helpers turn a mismatch into
//! [`Error::TypeMismatch`].

use std::any::Any;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::function::Function;
use crate::object::{Object, ObjectRef};
use crate::types::{Instance, TypeObject};
use crate::value::Value;

// ============================================================================
// Into Value
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::from(items))
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<TypeObject> for Value {
    fn from(t: TypeObject) -> Self {
        Value::Type(t)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Out of Value
// ============================================================================

impl Value {
    /// Wrap a host object
    pub fn object<T: Object>(obj: T) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list items
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as function
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get as type object
    pub fn as_type(&self) -> Option<&TypeObject> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Get as instance
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Get as opaque object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Downcast an object value to its concrete Rust type
    pub fn downcast_object<T: Any>(&self) -> Option<&T> {
        self.as_object()
            .and_then(|obj| obj.as_any().downcast_ref::<T>())
    }

    /// Get as string, or fail with a type mismatch
    pub fn expect_str(&self) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::type_mismatch("str", self.type_name()))
    }

    /// Get as bool, or fail with a type mismatch
    pub fn expect_bool(&self) -> Result<bool> {
        self.as_bool()
            .ok_or_else(|| Error::type_mismatch("bool", self.type_name()))
    }

    /// Get as integer, or fail with a type mismatch
    pub fn expect_int(&self) -> Result<i64> {
        self.as_int()
            .ok_or_else(|| Error::type_mismatch("int", self.type_name()))
    }

    /// Get as function, or fail with a type mismatch
    pub fn expect_function(&self) -> Result<&Function> {
        self.as_function()
            .ok_or_else(|| Error::type_mismatch("function", self.type_name()))
    }

    /// Get as instance, or fail with a type mismatch
    pub fn expect_instance(&self) -> Result<&Instance> {
        self.as_instance()
            .ok_or_else(|| Error::type_mismatch("instance", self.type_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_expect_mismatch() {
        let err = Value::from(4).expect_str().unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected str, got int");
        assert_eq!(Value::from(4).expect_int().unwrap(), 4);
    }
}
