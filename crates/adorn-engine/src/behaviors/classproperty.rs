//! Class-level read-only attribute
//!
//! The getter receives the owning type whether the attribute is read
//! through the type or through one of its instances.

use std::any::Any;

use adorn_sdk::{
    AccessOp, Args, Descriptor, Error, Function, Identity, Instance, Object, Result, TypeObject, Value,
};

/// Read-only attribute computed from the owning type
#[derive(Debug, Clone)]
pub struct ClassProperty {
    identity: Identity,
    fget: Function,
}

impl ClassProperty {
    /// Create a class property computed by `getter`
    pub fn new(getter: Function) -> Self {
        Self {
            identity: getter.identity().clone(),
            fget: getter,
        }
    }

    /// Override the doc string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.identity.doc = Some(doc.into());
        self
    }

    /// Identity of the getter
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Always fails: a class property cannot have a setter
    pub fn setter(&self, _setter: Function) -> Result<Self> {
        Err(self.readonly_violation(AccessOp::DefineSetter))
    }

    /// Always fails: a class property cannot have a deleter
    pub fn deleter(&self, _deleter: Function) -> Result<Self> {
        Err(self.readonly_violation(AccessOp::DefineDeleter))
    }

    fn readonly_violation(&self, operation: AccessOp) -> Error {
        Error::ReadonlyViolation {
            attribute: self.identity.name.clone(),
            operation,
        }
    }

    fn compute(&self, owner: &TypeObject) -> Result<Value> {
        self.fget.call(Args::one(owner.clone()))
    }
}

impl Object for ClassProperty {
    fn type_name(&self) -> &'static str {
        "classproperty"
    }

    fn identity(&self) -> Option<&Identity> {
        Some(&self.identity)
    }

    fn as_descriptor(&self) -> Option<&dyn Descriptor> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Descriptor for ClassProperty {
    fn get(&self, instance: &Instance, _name: &str) -> Result<Value> {
        self.compute(instance.ty())
    }

    fn get_class(&self, owner: &TypeObject, _name: &str) -> Option<Result<Value>> {
        Some(self.compute(owner))
    }

    fn set(&self, _instance: &Instance, name: &str, _value: Value) -> Result<()> {
        Err(Error::ReadonlyViolation {
            attribute: name.to_string(),
            operation: AccessOp::Set,
        })
    }

    fn delete(&self, _instance: &Instance, name: &str) -> Result<()> {
        Err(Error::ReadonlyViolation {
            attribute: name.to_string(),
            operation: AccessOp::Delete,
        })
    }
}

/// `classproperty` decorator expression: wrap `getter` into a class-level
/// read-only descriptor value
pub fn classproperty(getter: Value) -> Result<Value> {
    match getter {
        Value::Function(getter) => Ok(Value::object(ClassProperty::new(getter))),
        other => Err(Error::InvalidTarget {
            found: other.type_name(),
        }),
    }
}
