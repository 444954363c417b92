//! Functions: named, identity-carrying callables backed by Rust closures.
//!
//! A [`Function`] is a cheap handle. Binding it to a receiver produces a
//! bound method that shares the body and identity but prepends the receiver
//! to every call. Wrapper functions remember what they wrap.
//!
//! ```ignore
//! let add = Function::new("add", "calc", |args| {
//!     args.expect_positional("add", 2)?;
//!     Ok(Value::Int(args.positional()[0].expect_int()? + args.positional()[1].expect_int()?))
//! });
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::args::Args;
use crate::error::Result;
use crate::identity::{Identity, SourceLocation};
use crate::value::Value;

/// Body of a function
pub type NativeFn = dyn Fn(Args) -> Result<Value> + Send + Sync;

/// Global counter for function IDs
static NEXT_FUNCTION_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique function ID
fn generate_function_id() -> u64 {
    NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed)
}

struct FunctionInner {
    id: u64,
    identity: Identity,
    body: Arc<NativeFn>,
    receiver: Option<Value>,
    wrapped: Option<Function>,
}

/// A function or bound method
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    /// Create a function; its declared location is the caller's position
    #[track_caller]
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        body: impl Fn(Args) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        let identity = Identity::new(name, module).defined_at(SourceLocation::caller());
        Self::from_identity(identity, body)
    }

    /// Create a function with explicit identity metadata
    pub fn from_identity(
        identity: Identity,
        body: impl Fn(Args) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                id: generate_function_id(),
                identity,
                body: Arc::new(body),
                receiver: None,
                wrapped: None,
            }),
        }
    }

    /// Create a wrapper around `original` that carries its identity
    pub fn wrapping(
        original: &Function,
        body: impl Fn(Args) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                id: generate_function_id(),
                identity: original.identity().clone(),
                body: Arc::new(body),
                receiver: None,
                wrapped: Some(original.clone()),
            }),
        }
    }

    /// Unique ID, shared by a function and its bound methods
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

    /// The function this one wraps, if it is a wrapper
    pub fn wrapped(&self) -> Option<&Function> {
        self.inner.wrapped.as_ref()
    }

    /// The innermost wrapped function
    pub fn unwrap_all(&self) -> &Function {
        let mut current = self;
        while let Some(inner) = current.wrapped() {
            current = inner;
        }
        current
    }

    /// The bound receiver, for bound methods
    pub fn receiver(&self) -> Option<&Value> {
        self.inner.receiver.as_ref()
    }

    /// Check if this is a bound method
    pub fn is_bound(&self) -> bool {
        self.inner.receiver.is_some()
    }

    /// Bind a receiver, producing a bound method
    pub fn bind(&self, receiver: Value) -> Function {
        Self {
            inner: Arc::new(FunctionInner {
                id: self.inner.id,
                identity: self.inner.identity.clone(),
                body: Arc::clone(&self.inner.body),
                receiver: Some(receiver),
                wrapped: self.inner.wrapped.clone(),
            }),
        }
    }

    /// A copy of this function presenting `identity` instead of its own
    pub fn with_identity(&self, identity: Identity) -> Function {
        Self {
            inner: Arc::new(FunctionInner {
                id: self.inner.id,
                identity,
                body: Arc::clone(&self.inner.body),
                receiver: self.inner.receiver.clone(),
                wrapped: self.inner.wrapped.clone(),
            }),
        }
    }

    /// Invoke the function
    pub fn call(&self, args: Args) -> Result<Value> {
        match &self.inner.receiver {
            Some(receiver) => (self.inner.body)(args.prepend(receiver.clone())),
            None => (self.inner.body)(args),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id && self.inner.receiver == other.inner.receiver
    }
}

impl Eq for Function {}

impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
        self.inner.receiver.hash(state);
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            write!(f, "<bound method {}>", self.inner.identity.qualified_name())
        } else {
            write!(f, "<function {}>", self.inner.identity.qualified_name())
        }
    }
}
