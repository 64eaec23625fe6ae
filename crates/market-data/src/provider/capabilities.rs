//! Provider capabilities.
//!
//! Describes what a price provider can do so the registry can decide which
//! providers take part in a given request.

/// Describes the capabilities of a price provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Whether the provider can return current prices.
    pub supports_current: bool,

    /// Whether the provider can return historical OHLC candles.
    pub supports_historical: bool,
}
