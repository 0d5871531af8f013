//! Homework record types.
//!
//! A [`Homework`] is the most recent submission reported by the API. Its two
//! fields keep the distinction between a key that is missing from the record
//! and a key that is present with a `null` value, since the two lead to
//! different outcomes in the status tracker.

use std::fmt;

use serde_json::Value;

// ============================================================================
// ReviewStatus
// ============================================================================

/// A review status known to the bot, with its verdict sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    /// The reviewer accepted the work.
    Approved,
    /// The work is being reviewed.
    Reviewing,
    /// The reviewer returned the work with remarks.
    Rejected,
}

impl ReviewStatus {
    /// Every known status, in the order the API documents them.
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Looks up a status by its wire name.
    ///
    /// # Examples
    ///
    /// ```
    /// use homework_poller::ReviewStatus;
    ///
    /// assert_eq!(ReviewStatus::from_api("approved"), Some(ReviewStatus::Approved));
    /// assert_eq!(ReviewStatus::from_api("archived"), None);
    /// ```
    #[must_use]
    pub fn from_api(status: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == status)
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Returns the human-readable verdict sent to the user.
    #[must_use]
    pub const fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field
// ============================================================================

/// A single field of a homework record as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field {
    /// The key is not present in the record.
    #[default]
    Absent,
    /// The key is present with a `null` value.
    Null,
    /// The key is present with a value. Non-string values are kept in
    /// their JSON text form.
    Value(String),
}

impl Field {
    /// Reads `key` from a JSON object.
    #[must_use]
    pub fn from_json(record: &Value, key: &str) -> Self {
        match record.get(key) {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(Value::String(s)) => Self::Value(s.clone()),
            Some(other) => Self::Value(other.to_string()),
        }
    }

    /// Returns `true` if the key was missing from the record.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the value, if the key held a non-null value.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(s) => Some(s),
            Self::Absent | Self::Null => None,
        }
    }
}

// ============================================================================
// Homework
// ============================================================================

/// The most recent homework submission known to the API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Homework {
    /// The `homework_name` field.
    pub name: Field,
    /// The `status` field.
    pub status: Field,
}

impl Homework {
    /// Creates a homework record with a name and a status.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: Field::Value(name.into()),
            status: Field::Value(status.into()),
        }
    }

    /// The record used when the API reports no submissions at all.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            name: Field::Null,
            status: Field::Null,
        }
    }

    /// Interprets one element of the `homeworks` array.
    ///
    /// Fields other than `homework_name` and `status` are ignored. A
    /// non-object element yields a record with both fields absent.
    #[must_use]
    pub fn from_json(record: &Value) -> Self {
        Self {
            name: Field::from_json(record, "homework_name"),
            status: Field::from_json(record, "status"),
        }
    }
}

impl fmt::Display for Homework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn render(field: &Field) -> String {
            match field {
                Field::Absent => "<absent>".to_string(),
                Field::Null => "null".to_string(),
                Field::Value(v) => format!("{v:?}"),
            }
        }
        write!(
            f,
            "{{homework_name: {}, status: {}}}",
            render(&self.name),
            render(&self.status)
        )
    }
}
