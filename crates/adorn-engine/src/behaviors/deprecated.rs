//! Deprecation annotator
//!
//! Functions emit a notice on every call and then run unchanged. Types emit
//! a single notice when they are decorated and are returned as they are.
//! Notices point at the decoration site when it is known, otherwise at the
//! target's declared location.

use std::sync::Arc;

use adorn_sdk::{Args, Function, Identity, Result, SourceLocation, TypeObject, Value};
use tracing::debug;

use crate::dispatch::{Behavior, DispatchResult, HookContext};
use crate::notice::{default_sink, DeprecationNotice, NoticeSink};
use crate::resolver::{DecorationRequest, Decorator};

/// Best known location for a notice about `target`
pub fn locate(call_site: Option<&SourceLocation>, target: &Identity) -> SourceLocation {
    call_site
        .or(target.defined_at.as_ref())
        .cloned()
        .unwrap_or_else(SourceLocation::unknown)
}

/// The `deprecated` behavior
pub struct Deprecated {
    sink: Arc<dyn NoticeSink>,
}

impl Deprecated {
    /// Report through `sink`
    pub fn new(sink: Arc<dyn NoticeSink>) -> Self {
        Self { sink }
    }
}

impl Behavior for Deprecated {
    fn name(&self) -> &str {
        "deprecated"
    }

    fn wrap_function(&self, func: &Function, cx: &HookContext<'_>) -> DispatchResult {
        if let Err(err) = cx.expect_no_config() {
            return DispatchResult::Failed(err);
        }

        let notice = DeprecationNotice {
            message: format!("Deprecated function {}", func.name()),
            location: locate(cx.call_site(), func.identity()),
        };
        debug!(behavior = cx.behavior(), location = %notice.location, "function marked deprecated");

        let original = func.clone();
        let sink = Arc::clone(&self.sink);
        let wrapper = Function::wrapping(func, move |args: Args| {
            sink.emit(&notice);
            original.call(args)
        });
        DispatchResult::Wrapped(Value::Function(wrapper))
    }

    fn wrap_type(&self, ty: &TypeObject, cx: &HookContext<'_>) -> DispatchResult {
        if let Err(err) = cx.expect_no_config() {
            return DispatchResult::Failed(err);
        }

        self.sink.emit(&DeprecationNotice {
            message: format!("Deprecated class {}.{}", ty.module(), ty.name()),
            location: locate(cx.call_site(), ty.identity()),
        });
        DispatchResult::Wrapped(Value::Type(ty.clone()))
    }
}

/// `deprecated` decorator expression, reporting through the default sink
#[track_caller]
pub fn deprecated(args: Args) -> Result<Value> {
    deprecated_with_sink(default_sink(), args)
}

/// `deprecated` decorator expression reporting through `sink`
#[track_caller]
pub fn deprecated_with_sink(sink: Arc<dyn NoticeSink>, args: Args) -> Result<Value> {
    Decorator::construct(Arc::new(Deprecated::new(sink)), DecorationRequest::new(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_call_site() {
        let declared = SourceLocation::new("models.rs", 10);
        let identity = Identity::new("Old", "models").defined_at(declared.clone());
        let site = SourceLocation::new("app.rs", 3);

        assert_eq!(locate(Some(&site), &identity), site);
        assert_eq!(locate(None, &identity), declared);
        assert_eq!(locate(None, &Identity::new("Old", "models")), SourceLocation::unknown());
    }
}
