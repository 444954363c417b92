//! Adorn engine - two-phase decoration core and built-in behaviors
//!
//! A decorator expression can be applied bare (`dec(target)`) or with
//! configuration (`dec(config)(target)`), to a function or to a type. The
//! engine tells these apart at runtime:
//!
//! ```text
//! classify ──► resolver (WrapRole state machine) ──► dispatch ──► behavior hook
//! ```
//!
//! # Modules
//!
//! - [`classify`]: target classification and bare-target plausibility
//! - [`resolver`]: the [`Decorator`] object and role resolution
//! - [`dispatch`]: the [`Behavior`] trait and hook routing
//! - [`behaviors`]: `property`, `classproperty`, `once`, `deprecated` and
//!   closure-backed decorator bases
//! - [`notice`]: deprecation notice sinks
//! - [`config`] / [`logging`]: `adorn.toml` and subscriber setup
//!
//! # Example
//!
//! ```ignore
//! use adorn_engine::{once, Args, Function, Value};
//!
//! let add_one = Function::new("add_one", "calc", |args| {
//!     Ok(Value::Int(args.positional()[0].expect_int()? + 1))
//! });
//! let memoized = once(Args::one(add_one))?;
//! assert_eq!(memoized.call(Args::one(4))?, Value::from(5));
//! ```

#![warn(missing_docs)]

pub mod behaviors;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod notice;
pub mod resolver;

pub use adorn_sdk::{
    AccessOp, Args, Descriptor, Error, Function, Identity, Instance, Object, ObjectRef, Result,
    SourceLocation, TargetKind, TypeBuilder, TypeObject, Value,
};

pub use behaviors::{
    classproperty, deprecated, deprecated_with_sink, once, property, ClassDecorator, ClassProperty,
    Deprecated, FuncDecorator, InstanceDecorator, Once, PropertyBehavior, PropertyDescriptor,
    PropertyMode, PropertyOptions,
};
pub use classify::{classify, is_plausible_wrap_target, is_wrappable};
pub use config::{Config, ConfigError, DeprecationAction, DeprecationConfig, LogConfig, LogFormat};
pub use dispatch::{dispatch, Behavior, DispatchResult, HookContext, WrapTarget};
pub use notice::{DeprecationNotice, NoticeSink, RecordingSink, TracingSink};
pub use resolver::{resolve, DecorationRequest, Decorator, Resolution, WrapRole};

use std::sync::Arc;

/// Apply a loaded configuration: install the tracing subscriber and the
/// default deprecation sink
pub fn init(config: &Config) -> std::result::Result<(), ConfigError> {
    logging::init(&config.log)?;
    if !notice::set_default_sink(Arc::new(TracingSink::from_config(&config.deprecation))) {
        tracing::debug!("default deprecation sink already installed, keeping it");
    }
    Ok(())
}
