use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current USD price of one coin, in the primary API's field layout.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PriceData {
    /// Last price in USD
    pub usd: Decimal,

    /// Change over the last 24 hours, in percent
    #[serde(default)]
    pub usd_24h_change: Option<Decimal>,

    /// Traded volume over the last 24 hours, in USD
    #[serde(default)]
    pub usd_24h_vol: Option<Decimal>,

    /// Unix seconds of the last upstream update
    #[serde(default)]
    pub last_updated_at: Option<i64>,
}

/// Prices keyed by coin identifier (e.g. "bitcoin").
pub type PriceMap = BTreeMap<String, PriceData>;
