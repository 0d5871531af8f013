//! Homework review poller
//!
//! Polls the homework review API, detects status changes of the latest
//! submission and relays them through a [`Notifier`] exactly once, while
//! reporting each kind of failure only the first time it occurs.

pub mod client;
pub mod config;
pub mod cycle;
pub mod dedup;
pub mod error;
pub mod failure;
pub mod homework;
pub mod response;
pub mod scheduler;
pub mod tracker;

pub use client::{ApiResponse, FetchError, HomeworkApi, Notifier, NotifyError};
pub use config::{Config, Credentials};
pub use cycle::{Cursor, CycleOutcome, PollCycle};
pub use dedup::ErrorDeduplicator;
pub use error::{BotError, Result};
pub use failure::{FailureKind, PollFailure};
pub use homework::{Field, Homework, ReviewStatus};
pub use response::{extract, validate, ResponseFormatError, ResponseFormatKind};
pub use scheduler::{Scheduler, RETRY_PERIOD};
pub use tracker::{HomeworkField, HomeworkStatusError, HomeworkStatusKind, StatusTracker};
