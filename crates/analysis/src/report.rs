//! Signal report returned by the analyzers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Timeframe used when a request names none.
pub const DEFAULT_TIMEFRAME: &str = "15m";

/// Timeframes offered to clients.
pub const SUPPORTED_TIMEFRAMES: &[&str] = &["1m", "5m", "15m", "30m", "1h", "4h", "1d"];

/// Indicator values. Analyzers may leave any of them out and add their own.
/// Missing and null values are both written back as absent keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Indicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_short: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_long: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Trading signal for one pair and timeframe.
///
/// Keys beyond the ones modelled here (`volume`, `data_source`,
/// `strategy_details`, ...) are kept in `extra` and written back unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SignalReport {
    pub pair: String,
    pub timeframe: String,
    /// BUY, SELL or HOLD
    pub signal: String,
    /// 0 to 100, integer or float as the analyzer wrote it
    pub confidence: Number,
    /// ISO-8601 time the analysis ran
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub indicators: Indicators,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
