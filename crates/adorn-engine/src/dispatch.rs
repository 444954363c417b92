//! Dispatch core: route a confirmed target to a behavior hook
//!
//! Every behavior implements [`Behavior`], supplying a function hook, a
//! type hook, or both. A missing hook answers
//! [`DispatchResult::Unsupported`] instead of failing, so the resolver can
//! treat it as a recoverable signal during its single ambiguity retry.
//!
//! On success a wrapper function or type adopts the original's identity, so
//! callers see the same name and module they decorated. A replacement type
//! with a foreign identity is presented through a subtype carrying the
//! original's.

use adorn_sdk::{Args, Error, Function, Identity, Result, SourceLocation, TargetKind, TypeObject, Value};
use tracing::debug;

// ============================================================================
// Targets
// ============================================================================

/// A confirmed wrap target
#[derive(Debug, Clone)]
pub enum WrapTarget {
    /// A function or method
    Function(Function),
    /// A type
    Type(TypeObject),
}

impl WrapTarget {
    /// Kind of the target
    pub fn kind(&self) -> TargetKind {
        match self {
            WrapTarget::Function(_) => TargetKind::Function,
            WrapTarget::Type(_) => TargetKind::Type,
        }
    }

    /// Identity metadata of the target
    pub fn identity(&self) -> &Identity {
        match self {
            WrapTarget::Function(f) => f.identity(),
            WrapTarget::Type(t) => t.identity(),
        }
    }
}

impl TryFrom<&Value> for WrapTarget {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Function(f) => Ok(WrapTarget::Function(f.clone())),
            Value::Type(t) => Ok(WrapTarget::Type(t.clone())),
            other => Err(Error::InvalidTarget {
                found: other.type_name(),
            }),
        }
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// What a hook sees besides its target
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    behavior: &'a str,
    config: &'a Args,
    call_site: Option<&'a SourceLocation>,
}

impl<'a> HookContext<'a> {
    /// Create a context
    pub fn new(behavior: &'a str, config: &'a Args, call_site: Option<&'a SourceLocation>) -> Self {
        Self {
            behavior,
            config,
            call_site,
        }
    }

    /// Name of the behavior being applied
    pub fn behavior(&self) -> &'a str {
        self.behavior
    }

    /// Decorator configuration arguments
    pub fn config(&self) -> &'a Args {
        self.config
    }

    /// Where the decoration happened, when known
    pub fn call_site(&self) -> Option<&'a SourceLocation> {
        self.call_site
    }

    /// Fail with [`Error::Arity`] if any configuration was supplied
    pub fn expect_no_config(&self) -> Result<()> {
        self.config.expect_empty(self.behavior)
    }
}

/// Outcome of running a hook
#[derive(Debug)]
pub enum DispatchResult {
    /// The hook produced a wrapper
    Wrapped(Value),
    /// The behavior has no hook for this kind of target
    Unsupported(TargetKind),
    /// The hook ran and failed
    Failed(Error),
}

impl DispatchResult {
    /// Check if the hook produced a wrapper
    pub fn is_wrapped(&self) -> bool {
        matches!(self, DispatchResult::Wrapped(_))
    }

    /// Convert to a `Result`, turning `Unsupported` into
    /// [`Error::UnsupportedTargetKind`]
    pub fn into_result(self, behavior: &str) -> Result<Value> {
        match self {
            DispatchResult::Wrapped(value) => Ok(value),
            DispatchResult::Unsupported(kind) => Err(Error::UnsupportedTargetKind {
                behavior: behavior.to_string(),
                kind,
            }),
            DispatchResult::Failed(err) => Err(err),
        }
    }
}

impl From<Result<Value>> for DispatchResult {
    fn from(result: Result<Value>) -> Self {
        match result {
            Ok(value) => DispatchResult::Wrapped(value),
            Err(err) => DispatchResult::Failed(err),
        }
    }
}

/// A decoration policy.
///
/// Override `wrap_function`, `wrap_type`, or both. `accepts` narrows which
/// kinds make a bare single argument look like a wrap target.
pub trait Behavior: Send + Sync + 'static {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Kinds this behavior can wrap
    fn accepts(&self, kind: TargetKind) -> bool {
        kind != TargetKind::Neither
    }

    /// Wrap a function
    fn wrap_function(&self, func: &Function, cx: &HookContext<'_>) -> DispatchResult {
        let _ = (func, cx);
        DispatchResult::Unsupported(TargetKind::Function)
    }

    /// Wrap a type
    fn wrap_type(&self, ty: &TypeObject, cx: &HookContext<'_>) -> DispatchResult {
        let _ = (ty, cx);
        DispatchResult::Unsupported(TargetKind::Type)
    }
}

/// Run the hook matching `target`'s kind
pub fn dispatch(behavior: &dyn Behavior, target: &WrapTarget, cx: &HookContext<'_>) -> DispatchResult {
    let result = match target {
        WrapTarget::Function(func) => {
            debug!(behavior = behavior.name(), target = %func.identity().qualified_name(), "calling function hook");
            behavior.wrap_function(func, cx)
        }
        WrapTarget::Type(ty) => {
            debug!(behavior = behavior.name(), target = %ty.identity().qualified_name(), "calling type hook");
            behavior.wrap_type(ty, cx)
        }
    };

    match (result, target) {
        (DispatchResult::Wrapped(Value::Function(wrapper)), WrapTarget::Function(original)) => {
            DispatchResult::Wrapped(Value::Function(adopt_identity(wrapper, original.identity())))
        }
        (DispatchResult::Wrapped(Value::Type(wrapper)), WrapTarget::Type(original)) => {
            DispatchResult::Wrapped(Value::Type(adopt_type_identity(wrapper, original.identity())))
        }
        (DispatchResult::Unsupported(kind), _) => {
            debug!(behavior = behavior.name(), %kind, "hook not supported for this target");
            DispatchResult::Unsupported(kind)
        }
        (other, _) => other,
    }
}

fn adopt_identity(wrapper: Function, identity: &Identity) -> Function {
    if wrapper.identity() == identity {
        wrapper
    } else {
        wrapper.with_identity(identity.clone())
    }
}

fn adopt_type_identity(wrapper: TypeObject, identity: &Identity) -> TypeObject {
    if wrapper.identity() == identity {
        wrapper
    } else {
        wrapper.with_identity(identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Renaming;

    impl Behavior for Renaming {
        fn name(&self) -> &str {
            "renaming"
        }

        fn wrap_function(&self, func: &Function, _cx: &HookContext<'_>) -> DispatchResult {
            let inner = func.clone();
            let wrapper = Function::new("wrapper", "elsewhere", move |args| inner.call(args));
            DispatchResult::Wrapped(Value::Function(wrapper))
        }
    }

    #[test]
    fn test_wrapper_adopts_identity() {
        let f = Function::new("original", "tests", |_| Ok(Value::from(1)));
        let config = Args::new();
        let cx = HookContext::new("renaming", &config, None);
        let result = dispatch(&Renaming, &WrapTarget::Function(f.clone()), &cx);

        let DispatchResult::Wrapped(Value::Function(wrapper)) = result else {
            panic!("expected a wrapped function");
        };
        assert_eq!(wrapper.identity(), f.identity());
        assert_eq!(wrapper.call(Args::new()).unwrap(), Value::from(1));
    }

    struct Replacing;

    impl Behavior for Replacing {
        fn name(&self) -> &str {
            "replacing"
        }

        fn wrap_type(&self, ty: &TypeObject, _cx: &HookContext<'_>) -> DispatchResult {
            let marker = Value::from(ty.name());
            let replacement = TypeObject::builder("Replacement", "elsewhere")
                .member("replaces", marker)
                .build();
            DispatchResult::Wrapped(Value::Type(replacement))
        }
    }

    #[test]
    fn test_replacement_type_adopts_identity() {
        let user = TypeObject::builder("User", "accounts").doc("A user").build();
        let config = Args::new();
        let cx = HookContext::new("replacing", &config, None);
        let result = dispatch(&Replacing, &WrapTarget::Type(user.clone()), &cx);

        let DispatchResult::Wrapped(Value::Type(wrapped)) = result else {
            panic!("expected a wrapped type");
        };
        assert_eq!(wrapped.identity(), user.identity());
        assert!(!wrapped.is_subtype_of(&user));
        assert_eq!(wrapped.get_attr("replaces").unwrap(), Value::from("User"));
    }

    #[test]
    fn test_missing_hook_is_unsupported() {
        let ty = TypeObject::builder("T", "tests").build();
        let config = Args::new();
        let cx = HookContext::new("renaming", &config, None);
        let result = dispatch(&Renaming, &WrapTarget::Type(ty), &cx);
        assert!(matches!(result, DispatchResult::Unsupported(TargetKind::Type)));

        let err = result.into_result("renaming").unwrap_err();
        assert_eq!(err.to_string(), "decorator renaming does not support type decoration");
    }

    #[test]
    fn test_invalid_target() {
        let err = WrapTarget::try_from(&Value::from(42)).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { found: "int" }));
    }
}
