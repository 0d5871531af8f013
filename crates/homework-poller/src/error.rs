//! Error types for homework bot startup and configuration.
//!
//! Failures that happen inside a poll cycle are not errors of this kind:
//! they are classified into [`crate::PollFailure`] and never escape the
//! cycle. `BotError` covers what can stop the process before the loop
//! starts.

use std::path::PathBuf;

/// A specialized `Result` type for homework bot setup operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that prevent the bot from starting.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    // ========================================================================
    // Credential Errors
    // ========================================================================
    /// A required credential is not set in the environment.
    #[error("Не найден токен {name}. Программа остановлена\n\nSuggestion: Set {name} in the environment or in a .env file")]
    MissingCredential {
        /// Name of the missing environment variable.
        name: &'static str,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your homework-bot.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },
}

impl BotError {
    /// Creates a new `MissingCredential` error.
    #[must_use]
    pub const fn missing_credential(name: &'static str) -> Self {
        Self::MissingCredential { name }
    }

    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}
