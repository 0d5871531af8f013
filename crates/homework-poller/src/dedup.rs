//! Suppression of repeated failure reports.

use std::collections::HashMap;

use crate::failure::FailureKind;

/// Remembers which failure kinds have already been reported.
///
/// Flags are never cleared while the process runs: once a kind has been
/// reported, later occurrences are only logged. Kinds are tracked
/// independently of each other.
#[derive(Debug, Clone, Default)]
pub struct ErrorDeduplicator {
    notified: HashMap<FailureKind, bool>,
}

impl ErrorDeduplicator {
    /// Creates a deduplicator with every kind notifiable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `kind` has not been reported yet.
    #[must_use]
    pub fn should_notify(&self, kind: FailureKind) -> bool {
        !self.is_notified(kind)
    }

    /// Records that a report for `kind` has been attempted.
    pub fn mark_notified(&mut self, kind: FailureKind) {
        self.notified.insert(kind, true);
    }

    /// Returns `true` if `kind` has already been reported.
    #[must_use]
    pub fn is_notified(&self, kind: FailureKind) -> bool {
        self.notified.get(&kind).copied().unwrap_or(false)
    }
}
