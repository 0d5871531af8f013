//! One fetch-validate-extract-diff-notify pass.
//!
//! [`PollCycle`] owns all state that survives between cycles: the status
//! tracker, the error deduplicator and the request cursor. Each call to
//! [`PollCycle::run`] either completes or stops at the first failing step,
//! classifies the failure and reports it at most once per kind.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{HomeworkApi, Notifier};
use crate::dedup::ErrorDeduplicator;
use crate::failure::PollFailure;
use crate::response;
use crate::tracker::StatusTracker;

// ============================================================================
// Cursor
// ============================================================================

/// The `from_date` value sent with every request.
///
/// By default the cursor is fixed at start-up and every request asks for
/// the same window. With [`Cursor::advancing`] it follows the API's
/// `current_date` after each successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    from_date: i64,
    advance: bool,
}

impl Cursor {
    /// Creates a fixed cursor at `from_date` (unix seconds).
    #[must_use]
    pub const fn new(from_date: i64) -> Self {
        Self {
            from_date,
            advance: false,
        }
    }

    /// Creates a fixed cursor at the current time.
    #[must_use]
    pub fn starting_now() -> Self {
        Self::new(Utc::now().timestamp())
    }

    /// Sets whether the cursor follows `current_date`.
    #[must_use]
    pub const fn advancing(mut self, advance: bool) -> Self {
        self.advance = advance;
        self
    }

    /// Returns the value for the next request.
    #[must_use]
    pub const fn from_date(&self) -> i64 {
        self.from_date
    }

    fn follow(&mut self, raw: &Value) {
        if !self.advance {
            return;
        }
        if let Some(current_date) = raw.get("current_date").and_then(Value::as_i64) {
            debug!(from = self.from_date, to = current_date, "Advancing cursor");
            self.from_date = current_date;
        }
    }
}

// ============================================================================
// CycleOutcome
// ============================================================================

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The status did not change; nothing was sent.
    Unchanged,
    /// The status changed and this message was delivered.
    Delivered(String),
    /// The cycle stopped at a failing step.
    Failed {
        /// The classified failure.
        failure: PollFailure,
        /// Whether a report of the failure was sent to the user.
        reported: bool,
    },
}

impl CycleOutcome {
    /// Returns `true` if the cycle completed without a failure.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

// ============================================================================
// PollCycle
// ============================================================================

/// The poll-diff-notify state machine.
pub struct PollCycle<A, N> {
    api: A,
    notifier: N,
    tracker: StatusTracker,
    dedup: ErrorDeduplicator,
    cursor: Cursor,
}

impl<A: HomeworkApi, N: Notifier> PollCycle<A, N> {
    /// Creates a cycle with fresh tracker and deduplicator state.
    pub fn new(api: A, notifier: N, cursor: Cursor) -> Self {
        Self::with_state(
            api,
            notifier,
            StatusTracker::new(),
            ErrorDeduplicator::new(),
            cursor,
        )
    }

    /// Creates a cycle around existing state.
    pub const fn with_state(
        api: A,
        notifier: N,
        tracker: StatusTracker,
        dedup: ErrorDeduplicator,
        cursor: Cursor,
    ) -> Self {
        Self {
            api,
            notifier,
            tracker,
            dedup,
            cursor,
        }
    }

    /// Returns the status tracker.
    pub const fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Returns the error deduplicator.
    pub const fn dedup(&self) -> &ErrorDeduplicator {
        &self.dedup
    }

    /// Returns the request cursor.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Runs one cycle to completion.
    ///
    /// Never fails: every failure ends up in [`CycleOutcome::Failed`].
    #[instrument(skip_all, fields(from_date = self.cursor.from_date()))]
    pub async fn run(&mut self) -> CycleOutcome {
        let message = match self.poll().await {
            Ok(Some(message)) => message,
            Ok(None) => return CycleOutcome::Unchanged,
            Err(failure) => return self.report(failure).await,
        };

        match self.notifier.send(&message).await {
            Ok(()) => {
                debug!(message = %message, "Message sent");
                CycleOutcome::Delivered(message)
            }
            Err(e) => {
                let failure = PollFailure::from(e);
                error!(kind = %failure.kind(), error = %failure, "Failed to deliver status update");
                CycleOutcome::Failed {
                    failure,
                    reported: false,
                }
            }
        }
    }

    async fn poll(&mut self) -> Result<Option<String>, PollFailure> {
        let response = self.api.fetch(self.cursor.from_date()).await?;
        if response.status != 200 {
            warn!(status = response.status, "Homework API answered with a non-200 status");
        }

        let raw: Value = serde_json::from_str(&response.body)?;
        response::validate(&raw)?;
        let homework = response::extract(&raw);
        let message = self.tracker.diff(&homework)?;

        self.cursor.follow(&raw);
        Ok(message)
    }

    async fn report(&mut self, failure: PollFailure) -> CycleOutcome {
        let kind = failure.kind();
        error!(kind = %kind, error = %failure, "Poll cycle failed");

        if !kind.is_relayable() || !self.dedup.should_notify(kind) {
            debug!(kind = %kind, "Failure already reported, not relaying");
            return CycleOutcome::Failed {
                failure,
                reported: false,
            };
        }

        let text = failure.report_text();
        match self.notifier.send(&text).await {
            Ok(()) => info!(kind = %kind, "Failure reported"),
            Err(e) => error!(kind = %kind, error = %e, "Failed to deliver failure report"),
        }
        self.dedup.mark_notified(kind);

        CycleOutcome::Failed {
            failure,
            reported: true,
        }
    }
}
