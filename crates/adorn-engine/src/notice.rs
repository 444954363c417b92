//! Deprecation notices and where they go
//!
//! [`TracingSink`] reports notices as `warn` events on the
//! `adorn::deprecation` target, filtered by [`DeprecationAction`].
//! [`RecordingSink`] keeps them in memory for inspection.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::warn;

use adorn_sdk::SourceLocation;

use crate::config::{DeprecationAction, DeprecationConfig};

/// A single deprecation notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// Human readable message, e.g. `Deprecated function fetch`
    pub message: String,
    /// Decoration site the notice refers to
    pub location: SourceLocation,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Receiver of deprecation notices
pub trait NoticeSink: Send + Sync {
    /// Handle one notice
    fn emit(&self, notice: &DeprecationNotice);
}

// ============================================================================
// TracingSink
// ============================================================================

/// Reports notices through `tracing`
pub struct TracingSink {
    action: DeprecationAction,
    seen: Mutex<FxHashSet<SourceLocation>>,
}

impl TracingSink {
    /// Create a sink with the given policy
    pub fn new(action: DeprecationAction) -> Self {
        Self {
            action,
            seen: Mutex::new(FxHashSet::default()),
        }
    }

    /// Create a sink from the `[deprecation]` section
    pub fn from_config(config: &DeprecationConfig) -> Self {
        Self::new(config.action)
    }

    /// The reporting policy
    pub fn action(&self) -> DeprecationAction {
        self.action
    }

    /// Whether `notice` passes the policy, recording it as seen
    fn admits(&self, notice: &DeprecationNotice) -> bool {
        match self.action {
            DeprecationAction::Always => true,
            DeprecationAction::Once => self.seen.lock().insert(notice.location.clone()),
            DeprecationAction::Ignore => false,
        }
    }
}

impl NoticeSink for TracingSink {
    fn emit(&self, notice: &DeprecationNotice) {
        if self.admits(notice) {
            warn!(
                target: "adorn::deprecation",
                file = %notice.location.file,
                line = notice.location.line,
                "{}",
                notice.message
            );
        }
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// Collects notices in memory
#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<DeprecationNotice>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notices received so far
    pub fn notices(&self) -> Vec<DeprecationNotice> {
        self.notices.lock().clone()
    }

    /// Number of notices received
    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    /// Check if no notice was received
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }

    /// Forget received notices
    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl NoticeSink for RecordingSink {
    fn emit(&self, notice: &DeprecationNotice) {
        self.notices.lock().push(notice.clone());
    }
}

// ============================================================================
// Default sink
// ============================================================================

static DEFAULT_SINK: OnceCell<Arc<dyn NoticeSink>> = OnceCell::new();

/// Install the sink used by [`crate::deprecated`].
///
/// Returns `false` when a default sink was already installed or used.
pub fn set_default_sink(sink: Arc<dyn NoticeSink>) -> bool {
    DEFAULT_SINK.set(sink).is_ok()
}

/// The sink used by [`crate::deprecated`]; a [`TracingSink`] reporting
/// every notice unless another one was installed first
pub fn default_sink() -> Arc<dyn NoticeSink> {
    Arc::clone(DEFAULT_SINK.get_or_init(|| Arc::new(TracingSink::new(DeprecationAction::Always))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(line: u32) -> DeprecationNotice {
        DeprecationNotice {
            message: "Deprecated function old".to_string(),
            location: SourceLocation::new("lib.rs", line),
        }
    }

    #[test]
    fn test_once_policy_admits_each_location_once() {
        let sink = TracingSink::new(DeprecationAction::Once);
        assert!(sink.admits(&notice(1)));
        assert!(!sink.admits(&notice(1)));
        assert!(sink.admits(&notice(2)));
    }

    #[test]
    fn test_always_and_ignore() {
        let always = TracingSink::new(DeprecationAction::Always);
        assert!(always.admits(&notice(1)));
        assert!(always.admits(&notice(1)));

        let ignore = TracingSink::from_config(&DeprecationConfig {
            action: DeprecationAction::Ignore,
        });
        assert!(!ignore.admits(&notice(1)));
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.emit(&notice(3));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.notices()[0].to_string(), "lib.rs:3: Deprecated function old");
        sink.clear();
        assert!(sink.is_empty());
    }
}
