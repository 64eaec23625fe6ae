//! Price provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{OhlcCandle, PriceMap};

use super::capabilities::ProviderCapabilities;

/// Trait for upstream price APIs.
///
/// The registry orders providers by [`priority`](Self::priority) and walks
/// them until one succeeds.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use nexus_market_data::provider::{PriceProvider, ProviderCapabilities};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl PriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             supports_current: true,
///             supports_historical: false,
///         }
///     }
///
///     async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Unique identifier, e.g. "COINGECKO". Used for logging.
    fn id(&self) -> &'static str;

    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch the current USD price of every coin in `ids`.
    ///
    /// Coins the provider cannot price may be missing from the result.
    async fn current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError>;

    /// Fetch OHLC candles for `id` over the last `days` days, oldest first.
    ///
    /// Default implementation returns `NotSupported`.
    async fn historical_ohlc(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError> {
        let _ = (id, days);
        Err(MarketDataError::NotSupported {
            operation: "historical".to_string(),
            provider: self.id().to_string(),
        })
    }
}
