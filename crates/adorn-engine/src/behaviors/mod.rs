//! Built-in behaviors
//!
//! Each behavior implements [`crate::Behavior`] and exposes a decorator
//! expression function (`property(args)`, `once(args)`, ...) that runs the
//! construction phase with the caller's position as the decoration site.

pub mod classproperty;
pub mod custom;
pub mod deprecated;
pub mod once;
pub mod property;

pub use classproperty::{classproperty, ClassProperty};
pub use custom::{ClassDecorator, FuncDecorator, InstanceDecorator};
pub use deprecated::{deprecated, deprecated_with_sink, Deprecated};
pub use once::{once, Once};
pub use property::{property, PropertyBehavior, PropertyDescriptor, PropertyMode, PropertyOptions};
