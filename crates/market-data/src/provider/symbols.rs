//! Static mapping between coin identifiers and USDT trading pairs.
//!
//! Coin identifiers are the primary API's ids ("bitcoin"); trading pairs are
//! the exchange symbols the secondary API and the analyzers use ("BTCUSDT").

/// `(coin id, trading pair)`, in display order.
pub const COIN_PAIRS: &[(&str, &str)] = &[
    ("bitcoin", "BTCUSDT"),
    ("ethereum", "ETHUSDT"),
    ("binancecoin", "BNBUSDT"),
    ("solana", "SOLUSDT"),
    ("cardano", "ADAUSDT"),
    ("ripple", "XRPUSDT"),
    ("dogecoin", "DOGEUSDT"),
    ("polkadot", "DOTUSDT"),
    ("chainlink", "LINKUSDT"),
    ("polygon", "MATICUSDT"),
    ("avalanche-2", "AVAXUSDT"),
    ("litecoin", "LTCUSDT"),
    ("cosmos", "ATOMUSDT"),
    ("algorand", "ALGOUSDT"),
    ("vechain", "VETUSDT"),
    ("filecoin", "FILUSDT"),
    ("pepe", "PEPEUSDT"),
    ("shiba-inu", "SHIBUSDT"),
    ("floki", "FLOKIUSDT"),
    ("bonk", "BONKUSDT"),
    ("dogwifcoin", "WIFUSDT"),
];

/// Coins shown when a price request names none.
pub const DEFAULT_COIN_IDS: &[&str] = &[
    "bitcoin",
    "ethereum",
    "binancecoin",
    "solana",
    "cardano",
    "ripple",
    "dogecoin",
];

/// Trading pair for a coin id, if the coin is in the table.
pub fn pair_for_coin(coin_id: &str) -> Option<&'static str> {
    COIN_PAIRS
        .iter()
        .find(|(id, _)| *id == coin_id)
        .map(|(_, pair)| *pair)
}

/// All trading pairs in the table.
pub fn supported_pairs() -> Vec<&'static str> {
    COIN_PAIRS.iter().map(|(_, pair)| *pair).collect()
}
