//! Market data models
//!
//! - `price` - Current price snapshot per coin (PriceData, PriceMap)
//! - `ohlc` - Historical candles in the upstream array layout (OhlcCandle)

mod ohlc;
mod price;

pub use ohlc::OhlcCandle;
pub use price::{PriceData, PriceMap};
