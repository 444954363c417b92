//! Object and Descriptor traits: the protocol for opaque values
//!
//! Values that are neither plain data, functions, types nor instances are
//! objects: decorator objects waiting for their target, attribute
//! descriptors, host objects. Installing an object that exposes a
//! [`Descriptor`] as a type member routes attribute access on instances of
//! that type through it.

use std::any::Any;
use std::sync::Arc;

use crate::args::Args;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::types::{Instance, TypeObject};
use crate::value::Value;

/// Shared handle to an object
pub type ObjectRef = Arc<dyn Object>;

/// An opaque value with its own call and attribute protocol
pub trait Object: Send + Sync + 'static {
    /// Name used in messages and debug output
    fn type_name(&self) -> &'static str;

    /// Identity metadata, when the object stands in for a function or type
    fn identity(&self) -> Option<&Identity> {
        None
    }

    /// Call the object
    fn call(&self, args: Args) -> Result<Value> {
        let _ = args;
        Err(Error::NotCallable(self.type_name()))
    }

    /// Descriptor view, for objects that intercept attribute access
    fn as_descriptor(&self) -> Option<&dyn Descriptor> {
        None
    }

    /// For downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Attribute access hooks for a type member.
///
/// `name` is the attribute name the member is installed under.
pub trait Descriptor: Send + Sync {
    /// Data descriptors take precedence over instance slots and own writes
    /// and deletes. A non-data descriptor only supplies a read default that
    /// a slot of the same name shadows.
    fn is_data(&self) -> bool {
        true
    }

    /// Read through an instance
    fn get(&self, instance: &Instance, name: &str) -> Result<Value>;

    /// Read through the owning type.
    ///
    /// `None` means the attribute resolves to the descriptor object itself.
    fn get_class(&self, owner: &TypeObject, name: &str) -> Option<Result<Value>> {
        let _ = (owner, name);
        None
    }

    /// Write through an instance
    fn set(&self, instance: &Instance, name: &str, value: Value) -> Result<()>;

    /// Delete through an instance
    fn delete(&self, instance: &Instance, name: &str) -> Result<()>;
}
