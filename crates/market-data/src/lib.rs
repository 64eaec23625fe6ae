//! Nexus Market Data Crate
//!
//! This crate fetches cryptocurrency prices from public upstream APIs for
//! the Nexus dashboard server.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Current USD prices with 24h change, volume and update time
//! - Historical OHLC candles
//! - A time-based response cache shared with the signal service
//! - Exponential backoff when an upstream answers HTTP 429
//! - An ordered fallback chain of providers (CoinGecko, then Binance)
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  HTTP handlers   |
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ProviderRegistry |  (priority order, first success wins)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  PriceProvider   |  (CoinGecko, Binance)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  CachedFetcher   | --> |  ResponseCache   |  (keyed by URL)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  HttpTransport   |  (reqwest)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceData`] - Current price of one coin
//! - [`OhlcCandle`] - `[timestamp_ms, open, high, low, close]`
//! - [`ResponseCache`] - TTL cache of JSON values
//! - [`Backoff`] - Shared delay applied to rate-limited requests

pub mod backoff;
pub mod cache;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod provider;
pub mod registry;
pub mod service;

pub use backoff::{Backoff, BackoffConfig};
pub use cache::{CacheEntry, CacheStats, ResponseCache, DEFAULT_PRICE_TTL, DEFAULT_SIGNAL_TTL};
pub use errors::MarketDataError;
pub use fetch::{CachedFetcher, FetchRequest, HttpTransport, ReqwestTransport, TransportResponse};
pub use models::{OhlcCandle, PriceData, PriceMap};

// Re-export provider types
pub use provider::binance::BinanceProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::symbols::{pair_for_coin, supported_pairs, COIN_PAIRS, DEFAULT_COIN_IDS};
pub use provider::{PriceProvider, ProviderCapabilities};

pub use registry::ProviderRegistry;
pub use service::{MarketDataConfig, MarketDataService, MarketDataServiceTrait};
