//! Identity metadata carried by functions and types, and source locations.

use std::fmt;
use std::panic::Location;

/// A position in a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file path
    pub file: String,
    /// 1-based line number, 0 when unknown
    pub line: u32,
}

impl SourceLocation {
    /// Create a location
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Placeholder when nothing better is known
    pub fn unknown() -> Self {
        Self::new("UNKNOWN", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Externally visible identity of a function or type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Short name
    pub name: String,
    /// Declaring module
    pub module: String,
    /// Documentation string
    pub doc: Option<String>,
    /// Where the function or type was declared
    pub defined_at: Option<SourceLocation>,
}

impl Identity {
    /// Create an identity with no doc and no declared location
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            doc: None,
            defined_at: None,
        }
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the declared location
    pub fn defined_at(mut self, location: SourceLocation) -> Self {
        self.defined_at = Some(location);
        self
    }

    /// `module.name`, or just `name` for module-less identities
    pub fn qualified_name(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }
}
