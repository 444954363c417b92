//! Adorn SDK - the object model decorators operate on
//!
//! This crate provides the minimal types needed to hand functions and types
//! to the adorn decoration core and to receive wrapped ones back, without
//! depending on the core itself:
//!
//! - [`Value`]: dynamic values with identity-preserving handles
//! - [`Args`]: positional plus named call arguments
//! - [`Function`]: identity-carrying callables, bindable to a receiver
//! - [`TypeObject`] / [`Instance`]: member tables and per-instance slots
//! - [`Object`] / [`Descriptor`]: the protocol for decorator objects and
//!   attribute descriptors
//!
//! # Example
//!
//! ```ignore
//! use adorn_sdk::{Args, Function, TypeObject, Value};
//!
//! let title = Function::new("title", "blog.models", |args| {
//!     let this = args.positional()[0].expect_instance()?;
//!     this.get_attr("_title")
//! });
//! let post = TypeObject::builder("Post", "blog.models")
//!     .member("title", title)
//!     .build();
//! let p = post.instantiate(Args::new())?;
//! p.set_slot("_title", Value::from("hello"));
//! assert_eq!(p.call_method("title", Args::new())?, Value::from("hello"));
//! ```

#![warn(missing_docs)]

pub mod args;
pub mod convert;
pub mod error;
pub mod function;
pub mod identity;
pub mod object;
pub mod types;
pub mod value;

pub use args::Args;
pub use error::{AccessOp, Error, Result};
pub use function::{Function, NativeFn};
pub use identity::{Identity, SourceLocation};
pub use object::{Descriptor, Object, ObjectRef};
pub use types::{Instance, TypeBuilder, TypeObject};
pub use value::{TargetKind, Value};
