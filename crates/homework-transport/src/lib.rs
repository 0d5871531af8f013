//! Homework bot HTTP transport
//!
//! reqwest-backed implementations of the poller's capabilities:
//! [`PracticumClient`] queries the homework statuses endpoint and
//! [`TelegramNotifier`] delivers messages through the Telegram Bot API.
//!
//! Both share one [`reqwest::Client`]. No request timeout is configured; a
//! hung request stalls the poll loop until the connection gives up.

use homework_poller::FetchError;
use thiserror::Error;

pub mod practicum;
pub mod telegram;

pub use practicum::PracticumClient;
pub use telegram::TelegramNotifier;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("homework-bot/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while setting up the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builds the HTTP client shared by the API client and the notifier.
///
/// # Errors
///
/// Returns [`TransportError::Client`] if the TLS backend cannot be
/// initialised.
pub fn http_client() -> Result<reqwest::Client, TransportError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Maps a reqwest failure to the poller's fetch taxonomy.
///
/// Requests that could not even be built (a malformed endpoint, say) are
/// not network problems and are reported as [`FetchError::Other`].
pub(crate) fn fetch_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::Other(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}
