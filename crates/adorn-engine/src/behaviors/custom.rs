//! Closure-backed behaviors for host-defined decorators
//!
//! - [`FuncDecorator`]: wraps functions only
//! - [`ClassDecorator`]: wraps types only
//! - [`InstanceDecorator`]: runs a hook on every new instance of the
//!   decorated type, after its initializer
//!
//! Restricting the accepted kind also narrows what counts as a bare target:
//! a function-only decorator given a type argument treats it as
//! configuration, and the reverse.

use std::sync::Arc;

use adorn_sdk::{Args, Error, Function, Identity, Instance, Result, TargetKind, TypeObject, Value};

use crate::dispatch::{Behavior, DispatchResult, HookContext};
use crate::resolver::{DecorationRequest, Decorator};

/// Hook producing a wrapper for a function
pub type FunctionHook = dyn Fn(&Function, &Args) -> Result<Value> + Send + Sync;

/// Hook producing a replacement for a type
pub type TypeHook = dyn Fn(&TypeObject, &Args) -> Result<Value> + Send + Sync;

/// Hook run on each freshly initialized instance
pub type InstanceHook = dyn Fn(&Instance, &Args) -> Result<()> + Send + Sync;

// ============================================================================
// FuncDecorator
// ============================================================================

/// Function-only decorator backed by a closure
#[derive(Clone)]
pub struct FuncDecorator {
    name: String,
    hook: Arc<FunctionHook>,
}

impl FuncDecorator {
    /// Create a decorator; `hook` receives the target and the configuration
    pub fn new(
        name: impl Into<String>,
        hook: impl Fn(&Function, &Args) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Evaluate a decorator expression
    #[track_caller]
    pub fn decorate(&self, args: Args) -> Result<Value> {
        Decorator::construct(Arc::new(self.clone()), DecorationRequest::new(args))
    }
}

impl Behavior for FuncDecorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, kind: TargetKind) -> bool {
        kind == TargetKind::Function
    }

    fn wrap_function(&self, func: &Function, cx: &HookContext<'_>) -> DispatchResult {
        (self.hook)(func, cx.config()).into()
    }
}

// ============================================================================
// ClassDecorator
// ============================================================================

/// Type-only decorator backed by a closure
#[derive(Clone)]
pub struct ClassDecorator {
    name: String,
    hook: Arc<TypeHook>,
}

impl ClassDecorator {
    /// Create a decorator; `hook` receives the target and the configuration
    pub fn new(
        name: impl Into<String>,
        hook: impl Fn(&TypeObject, &Args) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Evaluate a decorator expression
    #[track_caller]
    pub fn decorate(&self, args: Args) -> Result<Value> {
        Decorator::construct(Arc::new(self.clone()), DecorationRequest::new(args))
    }
}

impl Behavior for ClassDecorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, kind: TargetKind) -> bool {
        kind == TargetKind::Type
    }

    fn wrap_type(&self, ty: &TypeObject, cx: &HookContext<'_>) -> DispatchResult {
        (self.hook)(ty, cx.config()).into()
    }
}

// ============================================================================
// InstanceDecorator
// ============================================================================

/// Type-only decorator whose hook sees each new instance.
///
/// The decorated type is replaced by a subtype with the same identity. Its
/// initializer runs the original one, then the hook with the decoration
/// configuration.
#[derive(Clone)]
pub struct InstanceDecorator {
    name: String,
    hook: Arc<InstanceHook>,
}

impl InstanceDecorator {
    /// Create a decorator; `hook` receives each instance and the configuration
    pub fn new(
        name: impl Into<String>,
        hook: impl Fn(&Instance, &Args) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            hook: Arc::new(hook),
        }
    }

    /// Evaluate a decorator expression
    #[track_caller]
    pub fn decorate(&self, args: Args) -> Result<Value> {
        Decorator::construct(Arc::new(self.clone()), DecorationRequest::new(args))
    }
}

impl Behavior for InstanceDecorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, kind: TargetKind) -> bool {
        kind == TargetKind::Type
    }

    fn wrap_type(&self, ty: &TypeObject, cx: &HookContext<'_>) -> DispatchResult {
        let parent = ty.clone();
        let config = cx.config().clone();
        let hook = Arc::clone(&self.hook);

        let init = Function::from_identity(Identity::new("__init__", ty.module()), move |args: Args| {
            let (this, rest) = args
                .split_first()
                .ok_or_else(|| Error::type_mismatch("instance", "nothing"))?;
            let instance = this.expect_instance()?.clone();
            match parent.initializer() {
                Some(init) => {
                    init.call(args.clone())?;
                }
                None => rest.expect_empty(parent.name())?,
            }
            hook(&instance, &config)?;
            Ok(Value::Null)
        });

        DispatchResult::Wrapped(Value::Type(ty.subtype().init(init).build()))
    }
}
