//! Error types for the adorn object model and decoration core

use std::fmt;

use crate::value::TargetKind;

/// Result type for model and decoration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Attribute operation rejected by a read-only attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOp {
    /// Assigning a value
    Set,
    /// Removing a value
    Delete,
    /// Registering a setter hook
    DefineSetter,
    /// Registering a deleter hook
    DefineDeleter,
}

impl fmt::Display for AccessOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessOp::Set => "set",
            AccessOp::Delete => "delete",
            AccessOp::DefineSetter => "define a setter for",
            AccessOp::DefineDeleter => "define a deleter for",
        };
        f.write_str(s)
    }
}

/// Errors raised by the object model, the resolver and the behaviors
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The behavior has no hook for this kind of target
    #[error("decorator {behavior} does not support {kind} decoration")]
    UnsupportedTargetKind {
        /// Behavior name
        behavior: String,
        /// Kind of the rejected target
        kind: TargetKind,
    },

    /// Both readings of an ambiguous application failed.
    ///
    /// Displays as the preferred (factory) reading's failure.
    #[error("{preferred}")]
    AmbiguousResolutionExhausted {
        /// Failure of the preferred factory reading
        #[source]
        preferred: Box<Error>,
        /// Failure of the swapped direct reading
        alternate: Box<Error>,
    },

    /// Write or delete on a read-only attribute
    #[error("can't {operation} readonly attribute '{attribute}'")]
    ReadonlyViolation {
        /// Attribute name
        attribute: String,
        /// Rejected operation
        operation: AccessOp,
    },

    /// Attribute lookup or removal found nothing
    #[error("'{owner}' has no attribute '{attribute}'")]
    AttributeMissing {
        /// Owning type name
        owner: String,
        /// Attribute name
        attribute: String,
    },

    /// A wrap target was required but the value is neither a function nor a type
    #[error("wrapped value is not a function or a type (got {found})")]
    InvalidTarget {
        /// Type name of the offending value
        found: &'static str,
    },

    /// Wrong number of arguments
    #[error("{callee}() expects {expected}, got {got}")]
    Arity {
        /// Name of the callee
        callee: String,
        /// Human readable expectation
        expected: String,
        /// Number of arguments received
        got: usize,
    },

    /// Argument of the wrong type
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Call on a value that cannot be called
    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),

    /// Malformed decorator options
    #[error("invalid decorator configuration: {0}")]
    InvalidConfig(String),

    /// Failure raised by host code
    #[error("{0}")]
    Raised(String),
}

impl Error {
    /// Shorthand for [`Error::AttributeMissing`]
    pub fn attribute_missing(owner: impl Into<String>, attribute: impl Into<String>) -> Self {
        Error::AttributeMissing {
            owner: owner.into(),
            attribute: attribute.into(),
        }
    }

    /// Shorthand for [`Error::TypeMismatch`]
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Shorthand for [`Error::Raised`]
    pub fn raised(message: impl Into<String>) -> Self {
        Error::Raised(message.into())
    }

    /// True for failures that mean "these arguments do not fit this call".
    ///
    /// The resolver uses this to decide whether an ambiguous reading may be
    /// swapped for the alternate one.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedTargetKind { .. }
                | Error::Arity { .. }
                | Error::TypeMismatch { .. }
                | Error::NotCallable(_)
                | Error::InvalidConfig(_)
        )
    }

    /// The failure reported to callers, peeling exhausted ambiguity wrappers
    pub fn preferred(&self) -> &Error {
        match self {
            Error::AmbiguousResolutionExhausted { preferred, .. } => preferred.preferred(),
            other => other,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Raised(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Raised(s.to_string())
    }
}
