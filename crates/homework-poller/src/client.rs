//! Capabilities the poll cycle depends on.
//!
//! The poller never talks HTTP itself. It is handed a [`HomeworkApi`] that
//! performs the GET request and a [`Notifier`] that delivers text to the
//! fixed recipient. `homework-transport` provides the production
//! implementations; tests substitute in-memory ones.

use async_trait::async_trait;

/// A raw answer from the homework API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, not yet decoded.
    pub body: String,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// The homework API could not be queried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The endpoint could not be reached or the body could not be read.
    #[error("Эндпоинт API недоступен: {0}")]
    Transport(String),

    /// Anything else, such as a request that could not be built.
    #[error("{0}")]
    Other(String),
}

/// A message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The messaging service could not be reached.
    #[error("messaging service unreachable: {0}")]
    Transport(String),

    /// The messaging service refused the message.
    #[error("message rejected: {description}")]
    Rejected {
        /// Reason given by the service.
        description: String,
    },
}

/// Queries the homework review API.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Requests homeworks updated since `from_date` (unix seconds).
    async fn fetch(&self, from_date: i64) -> Result<ApiResponse, FetchError>;
}

/// Sends text messages to a fixed recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text`.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: HomeworkApi + ?Sized> HomeworkApi for &T {
    async fn fetch(&self, from_date: i64) -> Result<ApiResponse, FetchError> {
        (**self).fetch(from_date).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for &T {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send(text).await
    }
}

#[async_trait]
impl<T: HomeworkApi + ?Sized> HomeworkApi for Box<T> {
    async fn fetch(&self, from_date: i64) -> Result<ApiResponse, FetchError> {
        (**self).fetch(from_date).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send(text).await
    }
}
