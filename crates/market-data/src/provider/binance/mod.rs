//! Binance ticker provider (secondary).
//!
//! Prices come from the public /ticker/24hr endpoint, one request per coin.
//! Coin ids are mapped to USDT trading pairs through the static symbol table;
//! coins without a pair are skipped. Historical data is not offered.
//! API documentation: https://developers.binance.com/docs/binance-spot-api-docs/rest-api

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::fetch::{CachedFetcher, FetchRequest};
use crate::models::{PriceData, PriceMap};
use crate::provider::symbols::pair_for_coin;
use crate::provider::{PriceProvider, ProviderCapabilities};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com/api/v3";
const PROVIDER_ID: &str = "BINANCE";

/// Response from /ticker/24hr. Numbers arrive as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    last_price: String,
    price_change_percent: String,
    /// Volume in the quote asset (USDT), i.e. dollars
    quote_volume: String,
    /// Unix milliseconds
    close_time: i64,
}

/// Binance ticker provider.
pub struct BinanceProvider {
    fetcher: Arc<CachedFetcher>,
    base_url: String,
}

impl BinanceProvider {
    pub fn new(fetcher: Arc<CachedFetcher>) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<CachedFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ticker_url(&self, symbol: &str) -> Result<String, MarketDataError> {
        let endpoint = format!("{}/ticker/24hr", self.base_url);
        Url::parse_with_params(&endpoint, &[("symbol", symbol)])
            .map(|url| url.to_string())
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Invalid URL {}: {}", endpoint, e),
            })
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<PriceData, MarketDataError> {
        let url = self.ticker_url(symbol)?;
        let value = self.fetcher.fetch_json(&FetchRequest::get(url)).await?;
        parse_ticker(symbol, value)
    }
}

fn parse_decimal(symbol: &str, field: &str, raw: &str) -> Result<Decimal, MarketDataError> {
    Decimal::from_str(raw).map_err(|e| MarketDataError::InvalidResponse {
        provider: PROVIDER_ID.to_string(),
        message: format!("Invalid {} '{}' for {}: {}", field, raw, symbol, e),
    })
}

fn parse_ticker(symbol: &str, value: Value) -> Result<PriceData, MarketDataError> {
    let ticker: Ticker24h =
        serde_json::from_value(value).map_err(|e| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse ticker for {}: {}", symbol, e),
        })?;

    Ok(PriceData {
        usd: parse_decimal(symbol, "lastPrice", &ticker.last_price)?,
        usd_24h_change: Some(parse_decimal(
            symbol,
            "priceChangePercent",
            &ticker.price_change_percent,
        )?),
        usd_24h_vol: Some(parse_decimal(symbol, "quoteVolume", &ticker.quote_volume)?),
        last_updated_at: Some(ticker.close_time / 1000),
    })
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_current: true,
            supports_historical: false,
        }
    }

    /// One request per coin. A failure for one coin is logged and the
    /// remaining coins are still fetched.
    async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
        let mut prices = PriceMap::new();
        let mut last_error: Option<MarketDataError> = None;

        for id in ids {
            let Some(symbol) = pair_for_coin(id) else {
                debug!("No Binance symbol for '{}', skipping", id);
                continue;
            };

            match self.fetch_ticker(symbol).await {
                Ok(price) => {
                    prices.insert(id.clone(), price);
                }
                Err(e) => {
                    warn!("Binance ticker for {} ({}) failed: {}", id, symbol, e);
                    last_error = Some(e);
                }
            }
        }

        if prices.is_empty() && !ids.is_empty() {
            return Err(match last_error {
                Some(e) => e,
                None => MarketDataError::SymbolNotFound(ids.join(",")),
            });
        }

        Ok(prices)
    }
}
