//! Status change detection.
//!
//! [`StatusTracker`] remembers the last review status it has seen and turns
//! a new homework record into at most one notification.

use std::fmt;

use tracing::{debug, info};

use crate::homework::{Field, Homework, ReviewStatus};

/// A required key of a homework record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkField {
    /// The `status` key.
    Status,
    /// The `homework_name` key.
    HomeworkName,
}

impl fmt::Display for HomeworkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::HomeworkName => write!(f, "homework_name"),
        }
    }
}

/// Categories of [`HomeworkStatusError`], used for error deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatusKind {
    /// A required key is missing.
    MissingField,
    /// The status is not one the bot knows.
    UnknownStatus,
}

impl fmt::Display for HomeworkStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "missing_field"),
            Self::UnknownStatus => write!(f, "unknown_status"),
        }
    }
}

/// The homework record cannot be turned into a status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HomeworkStatusError {
    /// One or more required keys are missing from the record.
    #[error("В ответе API нет ключа {}: {}", join_fields(.missing), .homework)]
    MissingField {
        /// The missing keys, `status` first.
        missing: Vec<HomeworkField>,
        /// The offending record.
        homework: Homework,
    },

    /// The status is neither `null` nor a known review status.
    #[error("Неизвестный статус домашки: {status}")]
    UnknownStatus {
        /// The status as received.
        status: String,
    },
}

fn join_fields(fields: &[HomeworkField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl HomeworkStatusError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> HomeworkStatusKind {
        match self {
            Self::MissingField { .. } => HomeworkStatusKind::MissingField,
            Self::UnknownStatus { .. } => HomeworkStatusKind::UnknownStatus,
        }
    }
}

/// Holds the last observed review status.
///
/// `None` stands for a `null` status, which is also the initial state: a
/// fresh tracker stays silent until a real status shows up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTracker {
    last_status: Option<ReviewStatus>,
}

impl StatusTracker {
    /// Creates a tracker that has not seen any status yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_status: None }
    }

    /// Returns the last observed status.
    #[must_use]
    pub const fn last_status(&self) -> Option<ReviewStatus> {
        self.last_status
    }

    /// Compares `homework` with the last observed status.
    ///
    /// Returns the notification text when the status changed to a known
    /// value. A change to `null` is recorded without a notification, since
    /// there is no verdict to report. On error the tracker is left as is.
    pub fn diff(&mut self, homework: &Homework) -> Result<Option<String>, HomeworkStatusError> {
        let missing: Vec<HomeworkField> = [
            (HomeworkField::Status, &homework.status),
            (HomeworkField::HomeworkName, &homework.name),
        ]
        .into_iter()
        .filter(|(_, field)| field.is_absent())
        .map(|(key, _)| key)
        .collect();
        if !missing.is_empty() {
            return Err(HomeworkStatusError::MissingField {
                missing,
                homework: homework.clone(),
            });
        }

        let new_status = match &homework.status {
            Field::Value(status) => Some(ReviewStatus::from_api(status).ok_or_else(|| {
                HomeworkStatusError::UnknownStatus {
                    status: status.clone(),
                }
            })?),
            Field::Null | Field::Absent => None,
        };

        if new_status == self.last_status {
            debug!(status = ?new_status, "Homework status unchanged");
            return Ok(None);
        }

        info!(from = ?self.last_status, to = ?new_status, "Homework status changed");
        self.last_status = new_status;

        Ok(new_status.map(|status| {
            let name = homework.name.as_value().unwrap_or_default();
            format!(
                "Изменился статус проверки работы \"{name}\". {}",
                status.verdict()
            )
        }))
    }
}
