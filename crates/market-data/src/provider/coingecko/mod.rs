//! CoinGecko price provider (primary).
//!
//! - Current prices for many coins in one call via /simple/price
//! - Historical candles via /coins/{id}/ohlc
//!
//! The public API is unauthenticated and rate limited; throttling is handled
//! by the shared fetcher's backoff.
//! API documentation: https://docs.coingecko.com/reference/introduction

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::fetch::{CachedFetcher, FetchRequest};
use crate::models::{OhlcCandle, PriceData, PriceMap};
use crate::provider::{PriceProvider, ProviderCapabilities};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";

/// CoinGecko price provider.
pub struct CoinGeckoProvider {
    fetcher: Arc<CachedFetcher>,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(fetcher: Arc<CachedFetcher>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<CachedFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let endpoint = format!("{}{}", self.base_url, path);
        Url::parse_with_params(&endpoint, params)
            .map(|url| url.to_string())
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Invalid URL {}: {}", endpoint, e),
            })
    }

    fn simple_price_url(&self, ids: &[String]) -> Result<String, MarketDataError> {
        let ids = ids.join(",");
        self.build_url(
            "/simple/price",
            &[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
                ("include_last_updated_at", "true"),
            ],
        )
    }

    fn ohlc_url(&self, id: &str, days: u32) -> Result<String, MarketDataError> {
        if !is_valid_coin_id(id) {
            return Err(MarketDataError::SymbolNotFound(id.to_string()));
        }
        let days = days.to_string();
        self.build_url(
            &format!("/coins/{}/ohlc", id),
            &[("vs_currency", "usd"), ("days", days.as_str())],
        )
    }
}

/// Coin ids are lowercase slugs like "avalanche-2".
fn is_valid_coin_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Decode a /simple/price body, skipping coins whose entry is malformed.
fn parse_simple_price(value: Value) -> Result<PriceMap, MarketDataError> {
    let entries: BTreeMap<String, Value> =
        serde_json::from_value(value).map_err(|e| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse price response: {}", e),
        })?;

    let mut prices = PriceMap::new();
    for (id, entry) in entries {
        match serde_json::from_value::<PriceData>(entry) {
            Ok(price) => {
                prices.insert(id, price);
            }
            Err(e) => warn!("Skipping malformed CoinGecko entry for '{}': {}", id, e),
        }
    }
    Ok(prices)
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_current: true,
            supports_historical: true,
        }
    }

    async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
        if ids.is_empty() {
            return Ok(PriceMap::new());
        }

        let url = self.simple_price_url(ids)?;
        debug!("CoinGecko price request for {} ids", ids.len());
        let value = self.fetcher.fetch_json(&FetchRequest::get(url)).await?;
        parse_simple_price(value)
    }

    async fn historical_ohlc(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError> {
        let url = self.ohlc_url(id, days)?;
        let value = self.fetcher.fetch_json(&FetchRequest::get(url)).await?;
        serde_json::from_value(value).map_err(|e| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse OHLC response for {}: {}", id, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::Backoff;
    use crate::cache::{ResponseCache, DEFAULT_PRICE_TTL};
    use crate::fetch::ScriptedTransport;
    use reqwest::StatusCode;
    use rust_decimal_macros::dec;

    fn provider(transport: Arc<ScriptedTransport>) -> CoinGeckoProvider {
        let fetcher = CachedFetcher::new(
            transport,
            Arc::new(ResponseCache::new()),
            Backoff::default(),
            DEFAULT_PRICE_TTL,
        );
        CoinGeckoProvider::with_base_url(Arc::new(fetcher), "https://cg.test/api/v3/")
    }

    #[test]
    fn test_provider_metadata() {
        let provider = provider(Arc::new(ScriptedTransport::new(vec![])));
        assert_eq!(provider.id(), "COINGECKO");
        assert_eq!(provider.priority(), 1);
        let caps = provider.capabilities();
        assert!(caps.supports_current);
        assert!(caps.supports_historical);
    }

    #[tokio::test]
    async fn test_current_prices_single_batched_request() {
        let transport = Arc::new(ScriptedTransport::new(vec![(
            StatusCode::OK,
            r#"{
                "bitcoin": {"usd": 50000.5, "usd_24h_change": 2.5, "usd_24h_vol": 1000000, "last_updated_at": 1700000000},
                "ethereum": {"usd": 3000}
            }"#,
        )]));
        let provider = provider(transport.clone());

        let prices = provider
            .current_prices(&["bitcoin".to_string(), "ethereum".to_string()])
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(
            transport.urls()[0],
            "https://cg.test/api/v3/simple/price?ids=bitcoin%2Cethereum&vs_currencies=usd\
             &include_24hr_change=true&include_24hr_vol=true&include_last_updated_at=true"
        );

        let btc = &prices["bitcoin"];
        assert_eq!(btc.usd, dec!(50000.5));
        assert_eq!(btc.usd_24h_change, Some(dec!(2.5)));
        assert_eq!(btc.usd_24h_vol, Some(dec!(1000000)));
        assert_eq!(btc.last_updated_at, Some(1700000000));

        let eth = &prices["ethereum"];
        assert_eq!(eth.usd, dec!(3000));
        assert_eq!(eth.usd_24h_change, None);
    }

    #[tokio::test]
    async fn test_malformed_entries_are_skipped() {
        let transport = Arc::new(ScriptedTransport::new(vec![(
            StatusCode::OK,
            r#"{"bitcoin": {"usd": 1.25}, "broken": {"eur": 1}}"#,
        )]));
        let provider = provider(transport);

        let prices = provider
            .current_prices(&["bitcoin".to_string(), "broken".to_string()])
            .await
            .unwrap();

        assert_eq!(prices.len(), 1);
        assert!(prices.contains_key("bitcoin"));
    }

    #[tokio::test]
    async fn test_empty_ids_skip_the_network() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let provider = provider(transport.clone());

        let prices = provider.current_prices(&[]).await.unwrap();

        assert!(prices.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let transport = Arc::new(ScriptedTransport::new(vec![(
            StatusCode::SERVICE_UNAVAILABLE,
            "down",
        )]));
        let provider = provider(transport);

        let err = provider
            .current_prices(&["bitcoin".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::HttpStatus { .. }));
    }

    #[tokio::test]
    async fn test_historical_ohlc() {
        let transport = Arc::new(ScriptedTransport::new(vec![(
            StatusCode::OK,
            "[[1700000000000, 100, 110, 95, 105], [1700014400000, 105, 108, 101, 102.5]]",
        )]));
        let provider = provider(transport.clone());

        let candles = provider.historical_ohlc("bitcoin", 7).await.unwrap();

        assert_eq!(
            transport.urls()[0],
            "https://cg.test/api/v3/coins/bitcoin/ohlc?vs_currency=usd&days=7"
        );
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp_ms(), 1700014400000);
        assert_eq!(candles[1].close(), dec!(102.5));
    }

    #[tokio::test]
    async fn test_historical_rejects_path_injection() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let provider = provider(transport.clone());

        let err = provider
            .historical_ohlc("../simple/price", 7)
            .await
            .unwrap_err();

        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));
        assert_eq!(transport.call_count(), 0);
    }
}
