//! Client for the homework statuses endpoint.

use std::fmt;

use async_trait::async_trait;
use homework_poller::{ApiResponse, FetchError, HomeworkApi};
use reqwest::header::AUTHORIZATION;
use tracing::{debug, instrument};

use crate::{fetch_error, http_client, TransportError};

/// Queries `GET <endpoint>?from_date=<ts>` with an OAuth token.
///
/// The body is returned undecoded together with the status code; error
/// envelopes such as `not_authenticated` arrive with 4xx statuses and are
/// interpreted by the poller.
///
/// # Example
///
/// ```no_run
/// use homework_poller::HomeworkApi;
/// use homework_transport::PracticumClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PracticumClient::new(
///     "https://practicum.yandex.ru/api/user_api/homework_statuses/",
///     "y0_token",
/// )?;
/// let response = client.fetch(0).await?;
/// println!("{}", response.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Creates a client with its own HTTP connection pool.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, TransportError> {
        Ok(Self::with_client(http_client()?, endpoint, token))
    }

    /// Creates a client on top of an existing HTTP client.
    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch(&self, from_date: i64) -> Result<ApiResponse, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(fetch_error)?;
        debug!(status, bytes = body.len(), "Homework API responded");

        Ok(ApiResponse { status, body })
    }
}
