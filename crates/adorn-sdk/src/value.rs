//! Dynamic values handed to and returned from decorated targets
//!
//! Primitive values are stored inline. Functions, types, instances and
//! objects are reference-counted handles whose equality and hashing follow
//! identity, so a memoized result comes back as the very same instance.
//!
//! # Truthiness
//!
//! ```text
//! Null, false, 0, 0.0, "", []   -> falsy
//! everything else               -> truthy
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::args::Args;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::identity::Identity;
use crate::object::ObjectRef;
use crate::types::{Instance, TypeObject};

/// Kind of a value as seen by the decoration core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A routine: plain function or bound method
    Function,
    /// A type object
    Type,
    /// Anything else, including callable objects
    Neither,
}

impl TargetKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Function => "function",
            TargetKind::Type => "type",
            TargetKind::Neither => "value",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamic value
#[derive(Clone)]
pub enum Value {
    /// Absence of a value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Immutable list
    List(Arc<[Value]>),
    /// Function or bound method
    Function(Function),
    /// Type object
    Type(TypeObject),
    /// Instance of a type
    Instance(Instance),
    /// Opaque object (descriptors, decorator objects, host objects)
    Object(ObjectRef),
}

impl Value {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Type(_) => "type",
            Value::Instance(_) => "instance",
            Value::Object(obj) => obj.type_name(),
        }
    }

    /// Classify this value for wrapping
    pub fn kind(&self) -> TargetKind {
        match self {
            Value::Function(_) => TargetKind::Function,
            Value::Type(_) => TargetKind::Type,
            _ => TargetKind::Neither,
        }
    }

    /// Truthiness of the value
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Function(_) | Value::Type(_) | Value::Instance(_) | Value::Object(_) => true,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Identity metadata, for values that carry one
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Value::Function(f) => Some(f.identity()),
            Value::Type(t) => Some(t.identity()),
            Value::Object(obj) => obj.identity(),
            _ => None,
        }
    }

    /// Call this value.
    ///
    /// Functions run their body, types construct an instance, objects use
    /// their own call protocol.
    pub fn call(&self, args: Args) -> Result<Value> {
        match self {
            Value::Function(f) => f.call(args),
            Value::Type(t) => t.instantiate(args).map(Value::Instance),
            Value::Object(obj) => obj.call(args),
            other => Err(Error::NotCallable(other.type_name())),
        }
    }

    /// Identity comparison: true when both handles point at the same allocation.
    ///
    /// Primitives compare by value.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => object_ptr_eq(a, b),
            (a, b) => a == b,
        }
    }
}

fn object_ptr_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise so that Eq and Hash agree
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a.id() == b.id(),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => object_ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(items) => items.hash(state),
            Value::Function(f) => f.hash(state),
            Value::Type(t) => t.id().hash(state),
            Value::Instance(i) => i.id().hash(state),
            Value::Object(obj) => (Arc::as_ptr(obj) as *const u8 as usize).hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Type(ty) => write!(f, "{ty:?}"),
            Value::Instance(inst) => write!(f, "{inst:?}"),
            Value::Object(obj) => match obj.identity() {
                Some(identity) => write!(f, "<{} {}>", obj.type_name(), identity.qualified_name()),
                None => write!(f, "<{}>", obj.type_name()),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from(Vec::<Value>::new()).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(Value::from(true).is_truthy());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::from("abc"), Value::from("abc".to_string()));
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]),
            Value::from(vec![Value::from(1), Value::from("a")])
        );
        assert_ne!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn test_ptr_eq_for_strings() {
        let a = Value::from("shared");
        let b = a.clone();
        let c = Value::from("shared");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a, c);
    }

    #[test]
    fn test_kind() {
        let f = Function::new("f", "tests", |_| Ok(Value::Null));
        let t = TypeObject::builder("T", "tests").build();
        assert_eq!(Value::from(f).kind(), TargetKind::Function);
        assert_eq!(Value::from(t).kind(), TargetKind::Type);
        assert_eq!(Value::from(3).kind(), TargetKind::Neither);
    }

    #[test]
    fn test_call_non_callable() {
        let err = Value::from(3).call(Args::new()).unwrap_err();
        assert!(matches!(err, Error::NotCallable("int")));
    }
}
