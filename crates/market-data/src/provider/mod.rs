//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that all upstream APIs implement
//! - Provider capabilities
//! - The static coin id to trading pair table
//! - Concrete providers (CoinGecko primary, Binance secondary)

mod capabilities;
mod traits;

pub mod binance;
pub mod coingecko;
pub mod symbols;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use traits::PriceProvider;
