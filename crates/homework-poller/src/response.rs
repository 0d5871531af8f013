//! Shape checks and homework extraction for decoded API payloads.
//!
//! [`validate`] must succeed before [`extract`] is called; `extract` relies
//! on the `homeworks` key being present and holding an array.

use std::fmt;

use serde_json::Value;

use crate::homework::Homework;

/// The ways a decoded payload can fail the shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormatKind {
    /// The API rejected the OAuth token.
    NotAuthenticated,
    /// The API reported an internal error.
    UnknownError,
    /// The payload has no `homeworks` key.
    MissingHomeworksKey,
    /// `homeworks` is present but is not an array.
    WrongType,
}

impl fmt::Display for ResponseFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not_authenticated"),
            Self::UnknownError => write!(f, "unknown_error"),
            Self::MissingHomeworksKey => write!(f, "missing_homeworks_key"),
            Self::WrongType => write!(f, "wrong_type"),
        }
    }
}

/// The payload does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ошибка следующая: {message}")]
pub struct ResponseFormatError {
    /// Which check failed.
    pub kind: ResponseFormatKind,
    /// Description of the failure, taken from the payload where possible.
    pub message: String,
}

impl ResponseFormatError {
    fn new(kind: ResponseFormatKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks that a decoded payload can be trusted.
///
/// Error envelopes (`code` = `not_authenticated` or `UnknownError`) are
/// recognised first, then the presence and type of `homeworks`.
pub fn validate(raw: &Value) -> Result<(), ResponseFormatError> {
    match raw.get("code").and_then(Value::as_str) {
        Some(code @ "not_authenticated") => {
            let message = raw
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(code);
            return Err(ResponseFormatError::new(
                ResponseFormatKind::NotAuthenticated,
                message,
            ));
        }
        Some("UnknownError") => {
            let message = match raw.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "None".to_string(),
            };
            return Err(ResponseFormatError::new(
                ResponseFormatKind::UnknownError,
                message,
            ));
        }
        _ => {}
    }

    match raw.get("homeworks") {
        None => Err(ResponseFormatError::new(
            ResponseFormatKind::MissingHomeworksKey,
            format!("Не найден ключ homeworks. Проверьте ответ API: {raw}"),
        )),
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(ResponseFormatError::new(
            ResponseFormatKind::WrongType,
            format!("Тип значения ключа homeworks не лист. Проверьте ответ API: {raw}"),
        )),
    }
}

/// Returns the most recent homework from a validated payload.
///
/// The API lists homeworks newest first, so element 0 is taken as is. An
/// empty list yields [`Homework::placeholder`].
pub fn extract(raw: &Value) -> Homework {
    raw.get("homeworks")
        .and_then(Value::as_array)
        .and_then(|homeworks| homeworks.first())
        .map_or_else(Homework::placeholder, Homework::from_json)
}
