//! Classification of everything that can go wrong in a poll cycle.
//!
//! Each pipeline step converts its own error into a [`PollFailure`] through
//! a `From` impl, so `?` in the cycle both propagates and classifies. The
//! first step that fails decides the failure; later steps do not run.

use std::fmt;

use crate::client::{FetchError, NotifyError};
use crate::response::{ResponseFormatError, ResponseFormatKind};
use crate::tracker::{HomeworkStatusError, HomeworkStatusKind};

/// Deduplication key for poll failures.
///
/// Response-format and homework-status failures are keyed by their
/// sub-kind, so an expired token and a malformed payload are tracked
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The endpoint could not be reached.
    Network,
    /// The body is not valid JSON.
    Decode,
    /// The payload has an unexpected shape.
    ResponseFormat(ResponseFormatKind),
    /// The homework record has no usable status.
    HomeworkStatus(HomeworkStatusKind),
    /// A message could not be delivered.
    Notify,
    /// Anything else.
    Unknown,
}

impl FailureKind {
    /// Returns `true` if failures of this kind may be reported to the user.
    ///
    /// Delivery failures are never reported through the same channel that
    /// just failed.
    #[must_use]
    pub const fn is_relayable(&self) -> bool {
        !matches!(self, Self::Notify)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network_failure"),
            Self::Decode => write!(f, "decode_failure"),
            Self::ResponseFormat(kind) => write!(f, "response_format_error/{kind}"),
            Self::HomeworkStatus(kind) => write!(f, "homework_status_error/{kind}"),
            Self::Notify => write!(f, "notify_failure"),
            Self::Unknown => write!(f, "unknown_failure"),
        }
    }
}

/// A classified failure of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollFailure {
    /// The endpoint could not be reached.
    #[error("Эндпоинт API недоступен: {0}")]
    Network(String),

    /// The body is not valid JSON.
    #[error("Формат ответа API не JSON: {0}")]
    Decode(String),

    /// The payload has an unexpected shape.
    #[error(transparent)]
    ResponseFormat(#[from] ResponseFormatError),

    /// The homework record has no usable status.
    #[error(transparent)]
    HomeworkStatus(#[from] HomeworkStatusError),

    /// A message could not be delivered.
    #[error("Ошибка при отправке сообщения: {0}")]
    Notify(#[from] NotifyError),

    /// Anything else.
    #[error("{0}")]
    Unknown(String),
}

impl PollFailure {
    /// Returns the deduplication key of this failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::Decode(_) => FailureKind::Decode,
            Self::ResponseFormat(err) => FailureKind::ResponseFormat(err.kind),
            Self::HomeworkStatus(err) => FailureKind::HomeworkStatus(err.kind()),
            Self::Notify(_) => FailureKind::Notify,
            Self::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// Returns the text sent to the user when this failure is first seen.
    ///
    /// Decode failures carry their own wording; everything else is reported
    /// as a generic malfunction.
    #[must_use]
    pub fn report_text(&self) -> String {
        match self {
            Self::Decode(_) => self.to_string(),
            _ => format!("Сбой в работе программы: {self}"),
        }
    }
}

impl From<FetchError> for PollFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport(message) => Self::Network(message),
            FetchError::Other(message) => Self::Unknown(message),
        }
    }
}

impl From<serde_json::Error> for PollFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
