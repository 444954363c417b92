//! Call arguments: ordered positional values plus named values.
//!
//! Named arguments live in a `BTreeMap`, so two argument sets that differ
//! only in the order their names were supplied are equal and hash alike.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// Arguments of a call or of a decorator expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Args {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl Args {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// A single positional argument
    pub fn one(value: impl Into<Value>) -> Self {
        Self {
            positional: vec![value.into()],
            named: BTreeMap::new(),
        }
    }

    /// Append a positional argument
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add or replace a named argument
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Positional arguments in order
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Named arguments, sorted by name
    pub fn named_args(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    /// Positional argument at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument by name
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// First positional argument
    pub fn first(&self) -> Option<&Value> {
        self.positional.first()
    }

    /// Total number of arguments, positional and named
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// True when there are no arguments at all
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Split off the first positional argument
    pub fn split_first(&self) -> Option<(&Value, Args)> {
        let (first, rest) = self.positional.split_first()?;
        Some((
            first,
            Args {
                positional: rest.to_vec(),
                named: self.named.clone(),
            },
        ))
    }

    /// A copy with `value` inserted before the positional arguments
    pub fn prepend(&self, value: Value) -> Args {
        let mut positional = Vec::with_capacity(self.positional.len() + 1);
        positional.push(value);
        positional.extend(self.positional.iter().cloned());
        Args {
            positional,
            named: self.named.clone(),
        }
    }

    /// Combine two argument sets; `other`'s positionals follow ours and its
    /// named values win on conflict
    pub fn merged(&self, other: &Args) -> Args {
        let mut merged = self.clone();
        merged.positional.extend(other.positional.iter().cloned());
        merged
            .named
            .extend(other.named.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Fail with [`Error::Arity`] unless exactly `count` positionals were given
    pub fn expect_positional(&self, callee: &str, count: usize) -> Result<()> {
        if self.positional.len() == count {
            Ok(())
        } else {
            Err(Error::Arity {
                callee: callee.to_string(),
                expected: format!("{count} positional argument(s)"),
                got: self.positional.len(),
            })
        }
    }

    /// Fail with [`Error::Arity`] if any argument was given
    pub fn expect_empty(&self, callee: &str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Arity {
                callee: callee.to_string(),
                expected: "no arguments".to_string(),
                got: self.len(),
            })
        }
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: BTreeMap::new(),
        }
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
