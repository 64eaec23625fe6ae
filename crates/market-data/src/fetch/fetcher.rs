use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use super::transport::{FetchRequest, HttpTransport};
use crate::backoff::Backoff;
use crate::cache::ResponseCache;
use crate::errors::MarketDataError;

/// Cache-first JSON fetcher with backoff on HTTP 429.
pub struct CachedFetcher {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<ResponseCache>,
    backoff: Backoff,
    ttl: Duration,
}

impl CachedFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<ResponseCache>,
        backoff: Backoff,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            backoff,
            ttl,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Fetch `request` and decode the body as JSON.
    ///
    /// A fresh cache entry for the URL is returned without touching the
    /// network. Rate-limited answers are retried after the shared backoff
    /// delay; every other answer resets that delay. Only successful bodies
    /// are cached.
    pub async fn fetch_json(&self, request: &FetchRequest) -> Result<Value, MarketDataError> {
        let mut retries = 0u32;

        loop {
            if let Some(cached) = self.cache.get_fresh(&request.url) {
                return Ok(cached);
            }

            let response = self.transport.send(request).await?;

            if response.status == StatusCode::TOO_MANY_REQUESTS {
                if !self.backoff.allows_retry(retries) {
                    warn!(
                        "Giving up on {} after {} rate-limited retries",
                        request.url, retries
                    );
                    return Err(MarketDataError::RateLimited {
                        provider: request.host(),
                    });
                }

                let delay = self.backoff.next_delay();
                retries += 1;
                warn!(
                    "Rate limited by {}, retrying in {}ms (retry {})",
                    request.host(),
                    delay.as_millis(),
                    retries
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            self.backoff.reset();

            if !response.status.is_success() {
                return Err(MarketDataError::HttpStatus {
                    status: response.status,
                    url: request.url.clone(),
                });
            }

            let data: Value = serde_json::from_str(&response.body).map_err(|e| {
                MarketDataError::InvalidResponse {
                    provider: request.host(),
                    message: format!("Body is not JSON: {}", e),
                }
            })?;

            debug!("Caching response for {}", request.url);
            self.cache.insert(request.url.clone(), data.clone(), self.ttl);
            return Ok(data);
        }
    }
}
