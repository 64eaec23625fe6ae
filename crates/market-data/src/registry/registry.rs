//! Provider registry for orchestrating price providers.
//!
//! The registry holds an explicit, priority-ordered list of providers:
//! - Current prices walk the list and the first success wins
//! - Historical candles come from the first provider that supports them,
//!   without fallback

use std::sync::Arc;

use log::{debug, info, warn};

use crate::errors::MarketDataError;
use crate::models::{OhlcCandle, PriceMap};
use crate::provider::PriceProvider;

/// Provider registry for orchestrating price fetching.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl ProviderRegistry {
    /// Create a registry. Providers are ordered by priority, ties keep the
    /// given order.
    pub fn new(mut providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self { providers }
    }

    /// Fetch current prices.
    ///
    /// Tries providers in priority order:
    /// 1. Skip providers without current price support
    /// 2. Fetch prices
    /// 3. On success return immediately
    /// 4. On failure log and try the next provider
    pub async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
        let providers: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.capabilities().supports_current)
            .collect();

        if providers.is_empty() {
            warn!("No providers available for current prices");
            return Err(MarketDataError::NoProvidersAvailable);
        }

        let mut last_error: Option<MarketDataError> = None;

        for provider in providers {
            debug!(
                "Fetching current prices for {} ids from '{}'",
                ids.len(),
                provider.id()
            );

            match provider.current_prices(ids).await {
                Ok(prices) => {
                    info!(
                        "Fetched {} prices from '{}'",
                        prices.len(),
                        provider.id()
                    );
                    return Ok(prices);
                }
                Err(e) => {
                    warn!(
                        "Provider '{}' failed with {}, trying next provider",
                        provider.id(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(MarketDataError::AllProvidersFailed))
    }

    /// Fetch OHLC candles from the highest priority provider that offers
    /// history. Failures propagate to the caller.
    pub async fn historical_ohlc(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.capabilities().supports_historical)
            .ok_or(MarketDataError::NoProvidersAvailable)?;

        debug!(
            "Fetching {} days of history for '{}' from '{}'",
            days,
            id,
            provider.id()
        );
        provider.historical_ohlc(id, days).await
    }

    /// Get the list of registered providers, in the order they are tried.
    pub fn providers(&self) -> &[Arc<dyn PriceProvider>] {
        &self.providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceData;
    use crate::provider::ProviderCapabilities;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        id: &'static str,
        priority: u8,
        call_count: AtomicUsize,
        should_fail: bool,
        historical: bool,
    }

    impl MockProvider {
        fn new(id: &'static str, priority: u8, should_fail: bool) -> Self {
            Self {
                id,
                priority,
                call_count: AtomicUsize::new(0),
                should_fail,
                historical: false,
            }
        }

        fn with_history(mut self) -> Self {
            self.historical = true;
            self
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        fn failure(&self) -> MarketDataError {
            MarketDataError::ProviderError {
                provider: self.id.to_string(),
                message: "Mock failure".to_string(),
            }
        }
    }

    #[async_trait::async_trait]
    impl PriceProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                supports_current: true,
                supports_historical: self.historical,
            }
        }

        async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.should_fail {
                return Err(self.failure());
            }
            Ok(ids
                .iter()
                .map(|id| {
                    (
                        id.clone(),
                        PriceData {
                            usd: dec!(100),
                            usd_24h_change: None,
                            usd_24h_vol: None,
                            last_updated_at: None,
                        },
                    )
                })
                .collect())
        }

        async fn historical_ohlc(
            &self,
            _id: &str,
            _days: u32,
        ) -> Result<Vec<OhlcCandle>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            if self.should_fail {
                return Err(self.failure());
            }
            Ok(vec![OhlcCandle(
                1700000000000,
                dec!(100),
                dec!(105),
                dec!(95),
                dec!(102),
            )])
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_provider_ordering_by_priority() {
        let providers: Vec<Arc<dyn PriceProvider>> = vec![
            Arc::new(MockProvider::new("LOW_PRIORITY", 20, false)),
            Arc::new(MockProvider::new("HIGH_PRIORITY", 5, false)),
            Arc::new(MockProvider::new("MED_PRIORITY", 10, false)),
        ];

        let registry = ProviderRegistry::new(providers);
        let ordered = registry.providers();

        assert_eq!(ordered[0].id(), "HIGH_PRIORITY");
        assert_eq!(ordered[1].id(), "MED_PRIORITY");
        assert_eq!(ordered[2].id(), "LOW_PRIORITY");
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let primary = Arc::new(MockProvider::new("PRIMARY", 1, false));
        let secondary = Arc::new(MockProvider::new("SECONDARY", 2, false));
        let registry = ProviderRegistry::new(vec![primary.clone(), secondary.clone()]);

        let prices = registry.current_prices(&ids(&["bitcoin"])).await.unwrap();

        assert_eq!(prices["bitcoin"].usd, dec!(100));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_failure() {
        let primary = Arc::new(MockProvider::new("PRIMARY", 1, true));
        let secondary = Arc::new(MockProvider::new("SECONDARY", 2, false));
        let registry = ProviderRegistry::new(vec![secondary.clone(), primary.clone()]);

        let prices = registry
            .current_prices(&ids(&["bitcoin", "ethereum"]))
            .await
            .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_failed_returns_last_error() {
        let registry = ProviderRegistry::new(vec![
            Arc::new(MockProvider::new("PRIMARY", 1, true)),
            Arc::new(MockProvider::new("SECONDARY", 2, true)),
        ]);

        let err = registry
            .current_prices(&ids(&["bitcoin"]))
            .await
            .unwrap_err();

        match err {
            MarketDataError::ProviderError { provider, .. } => assert_eq!(provider, "SECONDARY"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = ProviderRegistry::new(vec![]);

        let err = registry
            .current_prices(&ids(&["bitcoin"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::NoProvidersAvailable));

        let err = registry.historical_ohlc("bitcoin", 7).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoProvidersAvailable));
    }

    #[tokio::test]
    async fn test_historical_has_no_fallback() {
        let primary = Arc::new(MockProvider::new("PRIMARY", 1, true).with_history());
        let secondary = Arc::new(MockProvider::new("SECONDARY", 2, false).with_history());
        let registry = ProviderRegistry::new(vec![primary.clone(), secondary.clone()]);

        let err = registry.historical_ohlc("bitcoin", 7).await.unwrap_err();

        assert!(matches!(err, MarketDataError::ProviderError { .. }));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_historical_skips_providers_without_history() {
        let current_only = Arc::new(MockProvider::new("CURRENT_ONLY", 1, false));
        let with_history = Arc::new(MockProvider::new("HISTORY", 2, false).with_history());
        let registry = ProviderRegistry::new(vec![current_only.clone(), with_history.clone()]);

        let candles = registry.historical_ohlc("bitcoin", 7).await.unwrap();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].close(), dec!(102));
        assert_eq!(current_only.calls(), 0);
        assert_eq!(with_history.calls(), 1);
    }
}
