//! Attribute descriptor with caching, readonly and allow-empty modes
//!
//! ```text
//! property(Args::one(getter))                           plain computed attribute
//! property(Args::new().named("cached", "_x"))(getter)   memoized into slot `_x`
//! property(Args::new().named("readonly", "_x"))(getter) memoized, no write or delete
//! property(Args::new().named("setter", "_x"))(setter)   getter reads slot `_x`
//! ```
//!
//! Cached reads consult the owning instance's slot first. With
//! `allow_empty = false` a falsy value is never persisted, so the getter
//! runs again on each read until it produces something truthy.

use std::any::Any;
use std::sync::Arc;

use adorn_sdk::{
    AccessOp, Args, Descriptor, Error, Function, Identity, Instance, Object, Result, TargetKind, Value,
};
use tracing::{debug, error, trace};

use crate::dispatch::{Behavior, DispatchResult, HookContext};
use crate::resolver::{DecorationRequest, Decorator};

// ============================================================================
// Options
// ============================================================================

/// Which accessor the decorated function becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyMode {
    /// The decorated function computes the value
    #[default]
    Getter,
    /// The decorated function stores assigned values
    Setter,
    /// The decorated function handles deletion
    Deleter,
}

/// Parsed property configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOptions {
    /// Accessor role of the decorated function
    pub mode: PropertyMode,
    /// Instance slot holding the cached value
    pub slot: Option<String>,
    /// Reject writes and deletes
    pub readonly: bool,
    /// Persist falsy values
    pub allow_empty: bool,
    /// Doc string override
    pub doc: Option<String>,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            mode: PropertyMode::Getter,
            slot: None,
            readonly: false,
            allow_empty: true,
            doc: None,
        }
    }
}

impl PropertyOptions {
    /// Cache computed values in `slot`
    pub fn cached(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Cache computed values in `slot` and reject writes and deletes
    pub fn readonly(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self.readonly = true;
        self
    }

    /// Whether falsy values are cached
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Parse decorator configuration.
    ///
    /// Recognized names: `cached`, `cache`, `readonly`, `setter`, `deleter`
    /// (each taking a slot name), `allow_empty` and `doc`.
    pub fn from_config(config: &Args) -> Result<Self> {
        if !config.positional().is_empty() {
            return Err(Error::Arity {
                callee: "property".to_string(),
                expected: "named options only".to_string(),
                got: config.positional().len(),
            });
        }

        let mut options = Self::default();
        for (key, value) in config.named_args() {
            match key.as_str() {
                "cached" | "cache" => options.slot = Some(value.expect_str()?.to_string()),
                "readonly" => {
                    options.slot = Some(value.expect_str()?.to_string());
                    options.readonly = true;
                }
                "setter" | "deleter" => {
                    if options.mode != PropertyMode::Getter {
                        return Err(Error::InvalidConfig(
                            "setter and deleter are exclusive".to_string(),
                        ));
                    }
                    options.slot = Some(value.expect_str()?.to_string());
                    options.mode = if key == "setter" {
                        PropertyMode::Setter
                    } else {
                        PropertyMode::Deleter
                    };
                }
                "allow_empty" => options.allow_empty = value.expect_bool()?,
                "doc" => options.doc = Some(value.expect_str()?.to_string()),
                other => {
                    return Err(Error::InvalidConfig(format!("unknown property option '{other}'")))
                }
            }
        }

        if options.readonly && options.mode != PropertyMode::Getter {
            return Err(Error::InvalidConfig(
                "readonly properties cannot have a setter or deleter".to_string(),
            ));
        }
        Ok(options)
    }

    /// Build a descriptor around `func` in this configuration
    pub fn build(&self, func: &Function) -> PropertyDescriptor {
        let mut identity = func.identity().clone();
        if let Some(doc) = &self.doc {
            identity.doc = Some(doc.clone());
        }

        let mut descriptor = PropertyDescriptor {
            identity,
            fget: None,
            fset: None,
            fdel: None,
            slot: self.slot.clone(),
            readonly: self.readonly,
            allow_empty: self.allow_empty,
        };
        match self.mode {
            PropertyMode::Getter => descriptor.fget = Some(func.clone()),
            PropertyMode::Setter => descriptor.fset = Some(func.clone()),
            PropertyMode::Deleter => descriptor.fdel = Some(func.clone()),
        }
        descriptor
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Composed getter/setter/deleter with an optional cache slot
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    identity: Identity,
    fget: Option<Function>,
    fset: Option<Function>,
    fdel: Option<Function>,
    slot: Option<String>,
    readonly: bool,
    allow_empty: bool,
}

impl PropertyDescriptor {
    /// Uncached property computed by `getter`
    pub fn new(getter: &Function) -> Self {
        PropertyOptions::default().build(getter)
    }

    /// Identity of the decorated function
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Cache slot name
    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Check if writes and deletes are rejected
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Check if falsy values are cached
    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    /// A copy computing values with `getter`
    pub fn with_getter(&self, getter: Function) -> Self {
        Self {
            fget: Some(getter),
            ..self.clone()
        }
    }

    /// A copy storing assigned values with `setter`
    pub fn with_setter(&self, setter: Function) -> Result<Self> {
        if self.readonly {
            return Err(self.readonly_violation(AccessOp::DefineSetter));
        }
        Ok(Self {
            fset: Some(setter),
            ..self.clone()
        })
    }

    /// A copy handling deletion with `deleter`
    pub fn with_deleter(&self, deleter: Function) -> Result<Self> {
        if self.readonly {
            return Err(self.readonly_violation(AccessOp::DefineDeleter));
        }
        Ok(Self {
            fdel: Some(deleter),
            ..self.clone()
        })
    }

    /// Wrap into a value installable as a type member
    pub fn into_value(self) -> Value {
        Value::object(self)
    }

    fn readonly_violation(&self, operation: AccessOp) -> Error {
        Error::ReadonlyViolation {
            attribute: self.identity.name.clone(),
            operation,
        }
    }

    fn compute(&self, instance: &Instance, name: &str) -> Result<Value> {
        let Some(fget) = &self.fget else {
            return Err(Error::attribute_missing(instance.ty().name(), name));
        };
        fget.call(Args::one(instance.clone())).map_err(|err| {
            // a catch-all lookup on the type would otherwise hide this failure
            if matches!(err, Error::AttributeMissing { .. }) && instance.ty().has_fallback() {
                error!(property = %self.identity.qualified_name(), error = %err, "getter raised a missing attribute");
            }
            err
        })
    }

    /// Persist a computed value, bypassing the readonly check
    fn store(&self, instance: &Instance, slot: &str, value: Value) -> Result<()> {
        trace!(property = %self.identity.name, slot, "caching value");
        match &self.fset {
            Some(fset) => fset.call(Args::one(instance.clone()).with(value)).map(drop),
            None => {
                instance.set_slot(slot, value);
                Ok(())
            }
        }
    }
}

impl Object for PropertyDescriptor {
    fn type_name(&self) -> &'static str {
        "property"
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

impl Descriptor for PropertyDescriptor {
    fn get(&self, instance: &Instance, name: &str) -> Result<Value> {
        let Some(slot) = self.slot.as_deref() else {
            return self.compute(instance, name);
        };

        if let Some(value) = instance.slot(slot) {
            trace!(property = %self.identity.name, slot, "checking cache");
            if value.is_truthy() || self.allow_empty {
                return Ok(value);
            }
            debug!(property = %self.identity.name, slot, "cached value is empty, recomputing");
        }

        let value = self.compute(instance, name)?;
        if value.is_truthy() || self.allow_empty {
            self.store(instance, slot, value.clone())?;
        }
        Ok(value)
    }

    fn set(&self, instance: &Instance, name: &str, value: Value) -> Result<()> {
        if self.readonly {
            return Err(Error::ReadonlyViolation {
                attribute: name.to_string(),
                operation: AccessOp::Set,
            });
        }
        match (&self.fset, self.slot.as_deref()) {
            (Some(fset), _) => fset.call(Args::one(instance.clone()).with(value)).map(drop),
            (None, Some(slot)) => {
                instance.set_slot(slot, value);
                Ok(())
            }
            (None, None) => Err(Error::ReadonlyViolation {
                attribute: name.to_string(),
                operation: AccessOp::Set,
            }),
        }
    }

    fn delete(&self, instance: &Instance, name: &str) -> Result<()> {
        if self.readonly {
            return Err(Error::ReadonlyViolation {
                attribute: name.to_string(),
                operation: AccessOp::Delete,
            });
        }
        match (&self.fdel, self.slot.as_deref()) {
            (Some(fdel), _) => fdel.call(Args::one(instance.clone())).map(drop),
            (None, Some(slot)) => {
                debug!(property = %self.identity.name, slot, "deleting cached value");
                instance
                    .take_slot(slot)
                    .map(drop)
                    .ok_or_else(|| Error::attribute_missing(instance.ty().name(), name))
            }
            (None, None) => Err(Error::attribute_missing(instance.ty().name(), name)),
        }
    }
}

// ============================================================================
// Behavior
// ============================================================================

/// The `property` behavior: functions only
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyBehavior;

impl Behavior for PropertyBehavior {
    fn name(&self) -> &str {
        "property"
    }

    fn accepts(&self, kind: TargetKind) -> bool {
        kind == TargetKind::Function
    }

    fn wrap_function(&self, func: &Function, cx: &HookContext<'_>) -> DispatchResult {
        PropertyOptions::from_config(cx.config())
            .map(|options| options.build(func).into_value())
            .into()
    }
}

/// `property` decorator expression
#[track_caller]
pub fn property(args: Args) -> Result<Value> {
    Decorator::construct(Arc::new(PropertyBehavior), DecorationRequest::new(args))
}
