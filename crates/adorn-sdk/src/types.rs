//! Type objects and their instances.
//!
//! A [`TypeObject`] is a named member table with an optional parent, an
//! optional initializer and an optional catch-all fallback lookup. An
//! [`Instance`] owns a slot map for its per-instance attribute values.
//!
//! Attribute lookup on an instance:
//!
//! ```text
//! 1. member exposing a data Descriptor     -> descriptor.get
//! 2. instance slot                         -> slot value
//! 3. member exposing a non-data Descriptor -> descriptor.get
//! 4. member Function                       -> bound method
//! 5. any other member                      -> member value
//! 6. fallback lookup, if defined           -> fallback(instance, name)
//! ```
//!
//! A descriptor failing with `AttributeMissing` falls through to step 6.
//! Writes and deletes go to a data descriptor when there is one, otherwise
//! to the slot map.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::args::Args;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::identity::{Identity, SourceLocation};
use crate::object::Descriptor;
use crate::value::Value;

static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// TypeObject
// ============================================================================

struct TypeInner {
    id: u64,
    identity: Identity,
    parent: Option<TypeObject>,
    init: Option<Function>,
    fallback: Option<Function>,
    members: RwLock<FxHashMap<String, Value>>,
}

/// A type object
#[derive(Clone)]
pub struct TypeObject {
    inner: Arc<TypeInner>,
}

/// Builder for [`TypeObject`]
pub struct TypeBuilder {
    identity: Identity,
    parent: Option<TypeObject>,
    init: Option<Function>,
    fallback: Option<Function>,
    members: FxHashMap<String, Value>,
}

impl TypeBuilder {
    /// Set the parent type
    pub fn parent(mut self, parent: TypeObject) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the documentation string
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.identity.doc = Some(doc.into());
        self
    }

    /// Set the initializer, called with the new instance followed by the
    /// construction arguments
    pub fn init(mut self, init: Function) -> Self {
        self.init = Some(init);
        self
    }

    /// Set the catch-all lookup, called with the instance and the missing
    /// attribute name
    pub fn fallback(mut self, fallback: Function) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Add a member
    pub fn member(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Finish the type
    pub fn build(self) -> TypeObject {
        TypeObject {
            inner: Arc::new(TypeInner {
                id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
                identity: self.identity,
                parent: self.parent,
                init: self.init,
                fallback: self.fallback,
                members: RwLock::new(self.members),
            }),
        }
    }
}

impl TypeObject {
    /// Start a new type; its declared location is the caller's position
    #[track_caller]
    pub fn builder(name: impl Into<String>, module: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            identity: Identity::new(name, module).defined_at(SourceLocation::caller()),
            parent: None,
            init: None,
            fallback: None,
            members: FxHashMap::default(),
        }
    }

    /// Start a subtype presenting the same identity as this type
    pub fn subtype(&self) -> TypeBuilder {
        TypeBuilder {
            identity: self.inner.identity.clone(),
            parent: Some(self.clone()),
            init: None,
            fallback: None,
            members: FxHashMap::default(),
        }
    }

    /// A subtype of this type presenting `identity` instead of its own
    pub fn with_identity(&self, identity: Identity) -> TypeObject {
        TypeBuilder {
            identity,
            parent: Some(self.clone()),
            init: None,
            fallback: None,
            members: FxHashMap::default(),
        }
        .build()
    }

    /// Unique type ID
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Identity metadata
    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    /// Short name
    pub fn name(&self) -> &str {
        &self.inner.identity.name
    }

    /// Declaring module
    pub fn module(&self) -> &str {
        &self.inner.identity.module
    }

    /// Parent type
    pub fn parent(&self) -> Option<&TypeObject> {
        self.inner.parent.as_ref()
    }

    /// Check if this type is `other` or derives from it
    pub fn is_subtype_of(&self, other: &TypeObject) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.id() == other.id() {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// Add or replace a member after construction
    pub fn define(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.members.write().insert(name.into(), value.into());
    }

    /// Find a member on this type or its ancestors
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(value) = ty.inner.members.read().get(name) {
                return Some(value.clone());
            }
            current = ty.parent();
        }
        None
    }

    /// The nearest initializer in the ancestry
    pub fn initializer(&self) -> Option<&Function> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(init) = &ty.inner.init {
                return Some(init);
            }
            current = ty.parent();
        }
        None
    }

    /// The nearest fallback lookup in the ancestry
    pub fn fallback(&self) -> Option<&Function> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(fallback) = &ty.inner.fallback {
                return Some(fallback);
            }
            current = ty.parent();
        }
        None
    }

    /// Check if a catch-all lookup is defined
    pub fn has_fallback(&self) -> bool {
        self.fallback().is_some()
    }

    /// Construct an instance, running the initializer
    pub fn instantiate(&self, args: Args) -> Result<Instance> {
        let instance = Instance::new(self.clone());
        match self.initializer() {
            Some(init) => {
                init.call(args.prepend(Value::Instance(instance.clone())))?;
            }
            None => args.expect_empty(self.name())?,
        }
        Ok(instance)
    }

    /// Read an attribute through the type itself
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        let member = self
            .lookup(name)
            .ok_or_else(|| Error::attribute_missing(self.name(), name))?;
        if let Value::Object(obj) = &member {
            if let Some(descriptor) = obj.as_descriptor() {
                if let Some(result) = descriptor.get_class(self, name) {
                    return result;
                }
            }
        }
        Ok(member)
    }
}

impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<type {}>", self.inner.identity.qualified_name())
    }
}

// ============================================================================
// Instance
// ============================================================================

struct InstanceInner {
    id: u64,
    ty: TypeObject,
    slots: Mutex<FxHashMap<String, Value>>,
}

/// An instance of a [`TypeObject`]
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    fn new(ty: TypeObject) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
                ty,
                slots: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Unique instance ID
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The instance's type
    pub fn ty(&self) -> &TypeObject {
        &self.inner.ty
    }

    /// Check if both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------------

    /// Read a slot
    pub fn slot(&self, name: &str) -> Option<Value> {
        self.inner.slots.lock().get(name).cloned()
    }

    /// Check if a slot is set
    pub fn has_slot(&self, name: &str) -> bool {
        self.inner.slots.lock().contains_key(name)
    }

    /// Write a slot, returning the previous value
    pub fn set_slot(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.slots.lock().insert(name.into(), value)
    }

    /// Remove a slot, returning its value
    pub fn take_slot(&self, name: &str) -> Option<Value> {
        self.inner.slots.lock().remove(name)
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Read an attribute
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        let member = self.ty().lookup(name);
        let descriptor = member.as_ref().and_then(member_descriptor);

        if let Some(descriptor) = descriptor.filter(|d| d.is_data()) {
            return self.descriptor_get(descriptor, name);
        }

        if let Some(value) = self.slot(name) {
            return Ok(value);
        }

        if let Some(descriptor) = descriptor {
            return self.descriptor_get(descriptor, name);
        }

        match member {
            Some(Value::Function(method)) => Ok(Value::Function(
                method.bind(Value::Instance(self.clone())),
            )),
            Some(value) => Ok(value),
            None => self.fallback_lookup(name),
        }
    }

    /// Write an attribute
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let member = self.ty().lookup(name);
        if let Some(descriptor) = member.as_ref().and_then(member_descriptor) {
            if descriptor.is_data() {
                return descriptor.set(self, name, value);
            }
        }
        self.set_slot(name, value);
        Ok(())
    }

    /// Delete an attribute
    pub fn del_attr(&self, name: &str) -> Result<()> {
        let member = self.ty().lookup(name);
        if let Some(descriptor) = member.as_ref().and_then(member_descriptor) {
            if descriptor.is_data() {
                return descriptor.delete(self, name);
            }
        }
        self.take_slot(name)
            .map(drop)
            .ok_or_else(|| Error::attribute_missing(self.ty().name(), name))
    }

    /// Look up a method and call it
    pub fn call_method(&self, name: &str, args: Args) -> Result<Value> {
        self.get_attr(name)?.call(args)
    }

    fn descriptor_get(&self, descriptor: &dyn Descriptor, name: &str) -> Result<Value> {
        match descriptor.get(self, name) {
            Err(Error::AttributeMissing { .. }) if self.ty().has_fallback() => {
                self.fallback_lookup(name)
            }
            other => other,
        }
    }

    fn fallback_lookup(&self, name: &str) -> Result<Value> {
        match self.ty().fallback() {
            Some(fallback) => fallback.call(
                Args::one(Value::Instance(self.clone())).with(name),
            ),
            None => Err(Error::attribute_missing(self.ty().name(), name)),
        }
    }
}

fn member_descriptor(member: &Value) -> Option<&dyn Descriptor> {
    match member {
        Value::Object(obj) => obj.as_descriptor(),
        _ => None,
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} instance #{}>",
            self.inner.ty.identity().qualified_name(),
            self.inner.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_type() -> TypeObject {
        let init = Function::new("__init__", "geometry", |args| {
            args.expect_positional("Point", 3)?;
            let this = args.positional()[0].expect_instance()?;
            this.set_slot("x", args.positional()[1].clone());
            this.set_slot("y", args.positional()[2].clone());
            Ok(Value::Null)
        });
        let norm = Function::new("norm1", "geometry", |args| {
            let this = args.positional()[0].expect_instance()?;
            let x = this.get_attr("x")?.expect_int()?;
            let y = this.get_attr("y")?.expect_int()?;
            Ok(Value::Int(x.abs() + y.abs()))
        });
        TypeObject::builder("Point", "geometry")
            .init(init)
            .member("norm1", norm)
            .member("dimensions", 2)
            .build()
    }

    #[test]
    fn test_instantiate_runs_init() {
        let point = point_type();
        let p = point.instantiate(Args::one(3).with(-4)).unwrap();
        assert_eq!(p.get_attr("x").unwrap(), Value::from(3));
        assert_eq!(p.call_method("norm1", Args::new()).unwrap(), Value::from(7));
        assert_eq!(p.get_attr("dimensions").unwrap(), Value::from(2));
    }

    #[test]
    fn test_instantiate_arity() {
        let point = point_type();
        let err = point.instantiate(Args::one(1)).unwrap_err();
        assert!(matches!(err, Error::Arity { .. }));

        let empty = TypeObject::builder("Empty", "tests").build();
        assert!(empty.instantiate(Args::new()).is_ok());
        assert!(empty.instantiate(Args::one(1)).is_err());
    }

    #[test]
    fn test_missing_attribute_and_fallback() {
        let plain = TypeObject::builder("Plain", "tests").build();
        let p = plain.instantiate(Args::new()).unwrap();
        assert!(matches!(p.get_attr("nope"), Err(Error::AttributeMissing { .. })));
        assert!(matches!(p.del_attr("nope"), Err(Error::AttributeMissing { .. })));

        let fallback = Function::new("__getattr__", "tests", |args| {
            Ok(Value::from(format!("fallback:{}", args.positional()[1].expect_str()?)))
        });
        let lenient = TypeObject::builder("Lenient", "tests").fallback(fallback).build();
        let l = lenient.instantiate(Args::new()).unwrap();
        assert_eq!(l.get_attr("anything").unwrap(), Value::from("fallback:anything"));
    }

    #[test]
    fn test_subtype_keeps_identity_and_members() {
        let point = point_type();
        let sub = point.subtype().build();
        assert_eq!(sub.identity(), point.identity());
        assert_ne!(sub.id(), point.id());
        assert!(sub.is_subtype_of(&point));
        assert!(!point.is_subtype_of(&sub));

        let p = sub.instantiate(Args::one(1).with(1)).unwrap();
        assert_eq!(p.call_method("norm1", Args::new()).unwrap(), Value::from(2));
    }

    #[test]
    fn test_with_identity_renames_a_subtype() {
        let point = point_type();
        let renamed = point.with_identity(Identity::new("Vector", "algebra"));
        assert_eq!(renamed.name(), "Vector");
        assert_eq!(renamed.module(), "algebra");
        assert!(renamed.is_subtype_of(&point));

        let v = renamed.instantiate(Args::one(2).with(-2)).unwrap();
        assert_eq!(v.call_method("norm1", Args::new()).unwrap(), Value::from(4));
    }

    #[test]
    fn test_slots_shadow_plain_members() {
        let point = point_type();
        let p = point.instantiate(Args::one(0).with(0)).unwrap();
        p.set_attr("dimensions", 3).unwrap();
        assert_eq!(p.get_attr("dimensions").unwrap(), Value::from(3));
        p.del_attr("dimensions").unwrap();
        assert_eq!(p.get_attr("dimensions").unwrap(), Value::from(2));
    }

    /// Supplies a constant on read and nothing else
    struct Fixed(i64);

    impl crate::object::Object for Fixed {
        fn type_name(&self) -> &'static str {
            "fixed"
        }

        fn as_descriptor(&self) -> Option<&dyn Descriptor> {
            Some(self)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    impl Descriptor for Fixed {
        fn is_data(&self) -> bool {
            false
        }

        fn get(&self, _instance: &Instance, _name: &str) -> Result<Value> {
            Ok(Value::Int(self.0))
        }

        fn set(&self, _instance: &Instance, name: &str, _value: Value) -> Result<()> {
            Err(Error::attribute_missing("fixed", name))
        }

        fn delete(&self, _instance: &Instance, name: &str) -> Result<()> {
            Err(Error::attribute_missing("fixed", name))
        }
    }

    #[test]
    fn test_slots_shadow_non_data_descriptors() {
        let ty = TypeObject::builder("Gauge", "tests")
            .member("level", Value::Object(Arc::new(Fixed(5))))
            .build();
        let g = ty.instantiate(Args::new()).unwrap();
        assert_eq!(g.get_attr("level").unwrap(), Value::from(5));

        g.set_attr("level", 9).unwrap();
        assert_eq!(g.slot("level"), Some(Value::from(9)));
        assert_eq!(g.get_attr("level").unwrap(), Value::from(9));

        g.del_attr("level").unwrap();
        assert_eq!(g.get_attr("level").unwrap(), Value::from(5));
        assert!(matches!(g.del_attr("level"), Err(Error::AttributeMissing { .. })));
    }
}
