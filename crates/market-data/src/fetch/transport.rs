use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::errors::MarketDataError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("nexus-market-data/", env!("CARGO_PKG_VERSION"));

/// An outbound GET request.
///
/// Only `url` identifies the request for caching purposes; headers and the
/// timeout are options that never take part in the cache key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Host part of the URL, used to label errors.
    pub fn host(&self) -> String {
        host_of(&self.url)
    }
}

pub(crate) fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Raw upstream answer: status plus undecoded body.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends requests to the network.
///
/// Split out from the fetcher so that caching and backoff can be exercised
/// without real sockets.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse, MarketDataError>;
}

/// [`HttpTransport`] backed by a shared reqwest client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse, MarketDataError> {
        let mut builder = self
            .client
            .get(&request.url)
            .header(reqwest::header::ACCEPT, "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!("GET {}", request.url);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: request.host(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
