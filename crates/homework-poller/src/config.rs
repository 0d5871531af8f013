//! Configuration for the homework bot.
//!
//! Credentials come from the environment (a `.env` file is loaded by the
//! binary beforehand). Everything else lives in an optional
//! `homework-bot.json` with camelCase keys; missing keys take defaults.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "homework-bot.json";

/// Environment variable holding the homework API OAuth token.
pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the Telegram chat to notify.
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Default homework API endpoint.
fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

/// Default Telegram Bot API base URL.
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Default wait between poll cycles, in seconds.
const fn default_retry_period_secs() -> u64 {
    600
}

/// Default log file path.
fn default_log_file() -> String {
    "homework-bot.log".to_string()
}

// ============================================================================
// Credentials
// ============================================================================

/// The three secrets the bot cannot run without.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the homework API.
    pub practicum_token: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Telegram chat that receives notifications.
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `BotError::MissingCredential` naming the first variable that
    /// is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(BotError::missing_credential(name))
        };

        Ok(Self {
            practicum_token: require(PRACTICUM_TOKEN)?,
            telegram_token: require(TELEGRAM_TOKEN)?,
            telegram_chat_id: require(TELEGRAM_CHAT_ID)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

// ============================================================================
// Config
// ============================================================================

/// Runtime settings for the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// URL of the homework statuses endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Base URL of the Telegram Bot API.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Seconds to wait between poll cycles.
    #[serde(default = "default_retry_period_secs")]
    pub retry_period_secs: u64,

    /// Move the request cursor to the API's `current_date` after each
    /// successful cycle. Off by default: the cursor stays at start-up time.
    #[serde(default)]
    pub advance_cursor: bool,

    /// Log file path. An empty string disables file logging.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            telegram_api_url: default_telegram_api_url(),
            retry_period_secs: default_retry_period_secs(),
            advance_cursor: false,
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `homework-bot.json`; returns defaults if it is missing.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            BotError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `homework-bot.json` in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigParseError` if the file cannot be read or
    /// parsed, and `BotError::ConfigValidationError` if a value is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(BotError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| BotError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `endpoint` and `telegramApiUrl` must be http(s) URLs
    /// - `retryPeriodSecs` must be greater than 0
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("endpoint", &self.endpoint),
            ("telegramApiUrl", &self.telegram_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BotError::config_validation(
                    format!("{key} must be an http(s) URL, got '{url}'"),
                    format!("Set {key} to a full URL in your homework-bot.json"),
                ));
            }
        }

        if self.retry_period_secs == 0 {
            return Err(BotError::config_validation(
                "retryPeriodSecs must be greater than 0",
                "Set retryPeriodSecs to at least 1 in your homework-bot.json (default is 600)",
            ));
        }

        Ok(())
    }

    /// Returns the wait between poll cycles.
    #[must_use]
    pub const fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// Returns the log file path, if file logging is enabled.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        let trimmed = self.log_file.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }
}
