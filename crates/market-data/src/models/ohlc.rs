use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLC candle, serialized as `[timestamp_ms, open, high, low, close]`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OhlcCandle(pub i64, pub Decimal, pub Decimal, pub Decimal, pub Decimal);

impl OhlcCandle {
    pub fn timestamp_ms(&self) -> i64 {
        self.0
    }

    pub fn open(&self) -> Decimal {
        self.1
    }

    pub fn high(&self) -> Decimal {
        self.2
    }

    pub fn low(&self) -> Decimal {
        self.3
    }

    pub fn close(&self) -> Decimal {
        self.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_candle_uses_array_layout() {
        let candles: Vec<OhlcCandle> =
            serde_json::from_value(json!([[1709395200000i64, 61000.5, 62000, 60500.25, 61800]]))
                .unwrap();

        let candle = &candles[0];
        assert_eq!(candle.timestamp_ms(), 1709395200000);
        assert_eq!(candle.open(), dec!(61000.5));
        assert_eq!(candle.high(), dec!(62000));
        assert_eq!(candle.low(), dec!(60500.25));
        assert_eq!(candle.close(), dec!(61800));

        let back = serde_json::to_value(candle).unwrap();
        assert!(back.is_array());
        assert_eq!(back.as_array().map(Vec::len), Some(5));
    }
}
