//! HTTP transport for the movie collection.
//!
//! # Responsibilities
//! - Issue `GET <api url>` and read the whole body
//! - Turn non-2xx statuses into `FetchError::HttpStatus`
//! - Turn transport failures into `FetchError::Network`
//!
//! Deadlines are not set here; the caller wraps each call in a
//! `TimeoutGuard`, and dropping the returned future aborts the request.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::config::ApiConfig;
use crate::fetch::error::{FetchError, FetchResult};

/// Performs one network attempt.
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the body of a 2xx response.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<Vec<u8>>>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Non-success status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FetchResult<Vec<u8>>> {
        self.fetch(url).boxed()
    }
}
