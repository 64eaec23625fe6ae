//! Price service.
//!
//! Composes one shared [`CachedFetcher`] with the provider chain and exposes
//! the two price operations the HTTP layer needs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::backoff::{Backoff, BackoffConfig};
use crate::cache::{ResponseCache, DEFAULT_PRICE_TTL};
use crate::errors::MarketDataError;
use crate::fetch::{CachedFetcher, HttpTransport, ReqwestTransport};
use crate::models::{OhlcCandle, PriceMap};
use crate::provider::binance::{self, BinanceProvider};
use crate::provider::coingecko::{self, CoinGeckoProvider};
use crate::provider::PriceProvider;
use crate::registry::ProviderRegistry;

/// Settings for [`MarketDataService::from_config`].
#[derive(Clone, Debug)]
pub struct MarketDataConfig {
    pub coingecko_base_url: String,
    pub binance_base_url: String,
    /// Lifetime of cached upstream responses.
    pub price_ttl: Duration,
    pub backoff: BackoffConfig,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
            binance_base_url: binance::DEFAULT_BASE_URL.to_string(),
            price_ttl: DEFAULT_PRICE_TTL,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Price operations exposed to the HTTP layer.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Current USD prices for `ids`, from the first provider that answers.
    async fn get_current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError>;

    /// OHLC candles for `id` over the last `days` days, primary provider only.
    async fn get_historical_data(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError>;
}

pub struct MarketDataService {
    registry: ProviderRegistry,
}

impl MarketDataService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Build the CoinGecko then Binance chain over the real network.
    pub fn from_config(config: &MarketDataConfig, cache: Arc<ResponseCache>) -> Self {
        Self::with_transport(config, cache, Arc::new(ReqwestTransport::new()))
    }

    /// Build the default chain over any transport. Both providers share one
    /// fetcher, so they share the cache and the rate-limit backoff.
    pub fn with_transport(
        config: &MarketDataConfig,
        cache: Arc<ResponseCache>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let fetcher = Arc::new(CachedFetcher::new(
            transport,
            cache,
            Backoff::new(config.backoff.clone()),
            config.price_ttl,
        ));

        let providers: Vec<Arc<dyn PriceProvider>> = vec![
            Arc::new(CoinGeckoProvider::with_base_url(
                fetcher.clone(),
                config.coingecko_base_url.clone(),
            )),
            Arc::new(BinanceProvider::with_base_url(
                fetcher,
                config.binance_base_url.clone(),
            )),
        ];

        Self::new(ProviderRegistry::new(providers))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
        debug!("Current prices requested for {:?}", ids);
        self.registry.current_prices(ids).await
    }

    async fn get_historical_data(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError> {
        self.registry.historical_ohlc(id, days).await
    }
}
