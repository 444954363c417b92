//! Two-phase wrap resolution
//!
//! A decorator expression is evaluated before anyone knows whether it was
//! written bare (`@dec`, the target arrives at construction) or
//! parameterized (`@dec(args)`, the target arrives in a later call). The
//! [`Decorator`] object captures the construction arguments, tentatively
//! classifies them, and lets the next interaction confirm or revise the
//! guess:
//!
//! ```text
//!                 construction args
//!                        |
//!        plausible target?  --no-->  FACTORY
//!                        | yes
//!            type? --yes--> type hook now --Wrapped--> wrapped type returned
//!                        |                 --Unsupported/Failed--> FACTORY
//!                        | function
//!                    UNRESOLVED
//!                        |
//!      attribute access ---------------------------> DIRECT (bind)
//!      apply(args): args plausible? --yes--> FACTORY (ambiguous, may retry DIRECT once)
//!                                   --no---> DIRECT (invoke)
//! ```

use std::any::Any;
use std::sync::Arc;

use adorn_sdk::{
    AccessOp, Args, Descriptor, Error, Identity, Instance, Object, Result, SourceLocation, TargetKind,
    TypeObject, Value,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::classify::is_plausible_wrap_target;
use crate::dispatch::{dispatch, Behavior, DispatchResult, HookContext, WrapTarget};

// ============================================================================
// Request and role
// ============================================================================

/// Arguments captured when a decorator expression is evaluated
#[derive(Debug, Clone)]
pub struct DecorationRequest {
    args: Args,
    call_site: Option<SourceLocation>,
}

impl DecorationRequest {
    /// Capture `args`, recording the caller's position as the decoration site
    #[track_caller]
    pub fn new(args: Args) -> Self {
        Self {
            args,
            call_site: Some(SourceLocation::caller()),
        }
    }

    /// Capture `args` with no known decoration site
    pub fn detached(args: Args) -> Self {
        Self {
            args,
            call_site: None,
        }
    }

    /// The captured arguments
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Where the decorator expression was evaluated
    pub fn call_site(&self) -> Option<&SourceLocation> {
        self.call_site.as_ref()
    }
}

/// How a decorator application received its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapRole {
    /// Construction arguments were ambiguous; the next call decides
    Unresolved,
    /// Applied bare: the target was captured at construction
    Direct,
    /// Applied with configuration: the target arrives in a later call
    Factory,
}

/// Outcome of resolving a role for a confirming call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Confirmed role, never `Unresolved`
    pub role: WrapRole,
    /// Both the construction and the confirming call looked like a bare
    /// target, so one retry under `Direct` is permitted
    pub ambiguous: bool,
}

/// Decide the role for a confirming call with arguments `later`
pub fn resolve(
    role: WrapRole,
    request: &Args,
    later: &Args,
    accepts: impl Fn(TargetKind) -> bool,
) -> Resolution {
    match role {
        WrapRole::Direct | WrapRole::Factory => Resolution {
            role,
            ambiguous: false,
        },
        WrapRole::Unresolved if is_plausible_wrap_target(later, &accepts) => Resolution {
            role: WrapRole::Factory,
            ambiguous: is_plausible_wrap_target(request, &accepts),
        },
        WrapRole::Unresolved => Resolution {
            role: WrapRole::Direct,
            ambiguous: false,
        },
    }
}

// ============================================================================
// Decorator
// ============================================================================

/// One application of a behavior.
///
/// Returned (as a [`Value::Object`]) from construction whenever the target
/// has not been wrapped yet. Calling it confirms the role; installing it as
/// a type member makes attribute access confirm [`WrapRole::Direct`].
pub struct Decorator {
    behavior: Arc<dyn Behavior>,
    request: DecorationRequest,
    role: Mutex<WrapRole>,
    direct: OnceCell<Value>,
}

impl Decorator {
    /// Construction phase.
    ///
    /// Returns the wrapped type directly when a bare type could be wrapped
    /// right away, otherwise the decorator object.
    pub fn construct(behavior: Arc<dyn Behavior>, request: DecorationRequest) -> Result<Value> {
        let mut role = WrapRole::Factory;

        if is_plausible_wrap_target(request.args(), |kind| behavior.accepts(kind)) {
            match request.args().first() {
                Some(Value::Type(ty)) => {
                    debug!(behavior = behavior.name(), "construction received a type, wrapping it now");
                    let config = Args::new();
                    let cx = HookContext::new(behavior.name(), &config, request.call_site());
                    match dispatch(behavior.as_ref(), &WrapTarget::Type(ty.clone()), &cx) {
                        DispatchResult::Wrapped(wrapped) => return Ok(wrapped),
                        DispatchResult::Unsupported(_) => {
                            debug!(behavior = behavior.name(), "types are not supported, construction arguments are configuration");
                        }
                        DispatchResult::Failed(err) => {
                            debug!(behavior = behavior.name(), error = %err, "immediate type wrap failed, construction arguments are configuration");
                        }
                    }
                }
                _ => role = WrapRole::Unresolved,
            }
        } else {
            debug!(behavior = behavior.name(), "construction arguments are not wrappable, a later call supplies the target");
        }

        Ok(Value::Object(Arc::new(Self {
            behavior,
            request,
            role: Mutex::new(role),
            direct: OnceCell::new(),
        })))
    }

    /// Current role
    pub fn role(&self) -> WrapRole {
        *self.role.lock()
    }

    /// The captured construction request
    pub fn request(&self) -> &DecorationRequest {
        &self.request
    }

    /// Name of the applied behavior
    pub fn behavior_name(&self) -> &str {
        self.behavior.name()
    }

    /// Confirmation phase by invocation; records the caller's position as
    /// the decoration site for a factory application
    #[track_caller]
    pub fn apply(&self, args: Args) -> Result<Value> {
        self.apply_at(args, Some(SourceLocation::caller()))
    }

    fn apply_at(&self, args: Args, site: Option<SourceLocation>) -> Result<Value> {
        let resolution = resolve(self.role(), self.request.args(), &args, |kind| {
            self.behavior.accepts(kind)
        });
        *self.role.lock() = resolution.role;

        let attempt = match resolution.role {
            WrapRole::Factory => {
                debug!(behavior = self.behavior.name(), ambiguous = resolution.ambiguous, "applying as factory");
                self.apply_factory(&args, site.as_ref())
            }
            _ => self.apply_direct(args.clone()),
        };

        match attempt {
            Err(preferred) if resolution.ambiguous && preferred.is_signature_mismatch() => {
                debug!(behavior = self.behavior.name(), error = %preferred, "factory reading failed, swapping to direct reading");
                *self.role.lock() = WrapRole::Direct;
                self.apply_direct(args).map_err(|alternate| Error::AmbiguousResolutionExhausted {
                    preferred: Box::new(preferred),
                    alternate: Box::new(alternate),
                })
            }
            other => other,
        }
    }

    fn apply_factory(&self, args: &Args, site: Option<&SourceLocation>) -> Result<Value> {
        let (first, rest) = args
            .split_first()
            .ok_or(Error::InvalidTarget { found: "nothing" })?;
        let target = WrapTarget::try_from(first)?;
        let config = self.request.args().merged(&rest);
        let cx = HookContext::new(
            self.behavior.name(),
            &config,
            site.or(self.request.call_site()),
        );
        dispatch(self.behavior.as_ref(), &target, &cx).into_result(self.behavior.name())
    }

    fn apply_direct(&self, args: Args) -> Result<Value> {
        let wrapper = self.direct_wrapper()?;
        debug!(behavior = self.behavior.name(), "invoking decorated value");
        wrapper.call(args)
    }

    /// The captured target wrapped with no configuration, built once
    fn direct_wrapper(&self) -> Result<Value> {
        self.direct
            .get_or_try_init(|| {
                let first = self
                    .request
                    .args()
                    .first()
                    .ok_or(Error::InvalidTarget { found: "nothing" })?;
                let target = WrapTarget::try_from(first)?;
                let config = Args::new();
                let cx = HookContext::new(self.behavior.name(), &config, self.request.call_site());
                dispatch(self.behavior.as_ref(), &target, &cx).into_result(self.behavior.name())
            })
            .cloned()
    }

    fn confirm_direct(&self) {
        let mut role = self.role.lock();
        if *role != WrapRole::Direct {
            debug!(behavior = self.behavior.name(), "attribute access confirms the construction call was the wrap call");
            *role = WrapRole::Direct;
        }
    }

    /// Wrapper exposed through attribute access
    fn direct_descriptor_target(&self) -> Result<Value> {
        self.confirm_direct();
        self.direct_wrapper()
    }
}

impl Object for Decorator {
    fn type_name(&self) -> &'static str {
        "decorator"
    }

    fn identity(&self) -> Option<&Identity> {
        if is_plausible_wrap_target(self.request.args(), |kind| self.behavior.accepts(kind)) {
            self.request.args().first().and_then(Value::identity)
        } else {
            None
        }
    }

    fn call(&self, args: Args) -> Result<Value> {
        self.apply_at(args, None)
    }

    fn as_descriptor(&self) -> Option<&dyn Descriptor> {
        match self.role() {
            WrapRole::Factory => None,
            _ => Some(self),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// A wrapped method is a non-data descriptor, so an instance slot of the
// same name shadows it. Only a wrapped data descriptor claims writes and
// deletes; a lazily failing wrap stays data so reads report the failure.
impl Descriptor for Decorator {
    fn is_data(&self) -> bool {
        match self.direct_descriptor_target() {
            Ok(Value::Object(obj)) => obj.as_descriptor().is_some_and(|d| d.is_data()),
            Ok(_) => false,
            Err(_) => true,
        }
    }

    fn get(&self, instance: &Instance, name: &str) -> Result<Value> {
        match self.direct_descriptor_target()? {
            Value::Object(obj) => match obj.as_descriptor() {
                Some(descriptor) => descriptor.get(instance, name),
                None => Ok(Value::Object(obj)),
            },
            Value::Function(wrapper) => Ok(Value::Function(
                wrapper.bind(Value::Instance(instance.clone())),
            )),
            other => Ok(other),
        }
    }

    fn get_class(&self, owner: &TypeObject, name: &str) -> Option<Result<Value>> {
        let result = match self.direct_descriptor_target() {
            Ok(Value::Object(obj)) => match obj.as_descriptor() {
                Some(descriptor) => descriptor
                    .get_class(owner, name)
                    .unwrap_or_else(|| Ok(Value::Object(obj.clone()))),
                None => Ok(Value::Object(obj)),
            },
            other => other,
        };
        Some(result)
    }

    fn set(&self, instance: &Instance, name: &str, value: Value) -> Result<()> {
        match self.direct_descriptor_target()? {
            Value::Object(obj) => match obj.as_descriptor() {
                Some(descriptor) => descriptor.set(instance, name, value),
                None => Err(readonly(name, AccessOp::Set)),
            },
            _ => Err(readonly(name, AccessOp::Set)),
        }
    }

    fn delete(&self, instance: &Instance, name: &str) -> Result<()> {
        match self.direct_descriptor_target()? {
            Value::Object(obj) => match obj.as_descriptor() {
                Some(descriptor) => descriptor.delete(instance, name),
                None => Err(readonly(name, AccessOp::Delete)),
            },
            _ => Err(readonly(name, AccessOp::Delete)),
        }
    }
}

fn readonly(name: &str, operation: AccessOp) -> Error {
    Error::ReadonlyViolation {
        attribute: name.to_string(),
        operation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adorn_sdk::Function;

    fn any_kind(_: TargetKind) -> bool {
        true
    }

    fn func(name: &str) -> Value {
        Value::from(Function::new(name, "tests", |_| Ok(Value::Null)))
    }

    #[test]
    fn test_confirmed_roles_stay() {
        let request = Args::one(func("f"));
        let later = Args::one(func("g"));
        for role in [WrapRole::Direct, WrapRole::Factory] {
            let resolution = resolve(role, &request, &later, any_kind);
            assert_eq!(resolution, Resolution { role, ambiguous: false });
        }
    }

    #[test]
    fn test_unresolved_with_plain_args_is_direct() {
        let resolution = resolve(WrapRole::Unresolved, &Args::one(func("f")), &Args::one(4), any_kind);
        assert_eq!(resolution.role, WrapRole::Direct);
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_double_ambiguity_prefers_factory() {
        let resolution = resolve(
            WrapRole::Unresolved,
            &Args::one(func("callback")),
            &Args::one(func("target")),
            any_kind,
        );
        assert_eq!(resolution.role, WrapRole::Factory);
        assert!(resolution.ambiguous);
    }

    #[test]
    fn test_request_captures_call_site() {
        let request = DecorationRequest::new(Args::new());
        let site = request.call_site().unwrap();
        assert!(site.file.ends_with("resolver.rs"));
        assert!(DecorationRequest::detached(Args::new()).call_site().is_none());
    }
}
