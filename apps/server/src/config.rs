use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use nexus_market_data::{
    provider::{binance, coingecko},
    BackoffConfig, MarketDataConfig, DEFAULT_PRICE_TTL, DEFAULT_SIGNAL_TTL,
};

use crate::auth::{DEMO_PASSWORD, DEMO_USERNAME};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    /// Bound on routes that do not wait on upstream prices or analyzers.
    pub request_timeout: Duration,
    pub static_dir: String,
    pub market_data: MarketDataConfig,
    pub signal_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub analyzer_cmd: String,
    pub fallback_analyzer_cmd: String,
    /// `None` lets an analyzer run indefinitely.
    pub analyzer_timeout: Option<Duration>,
    pub analyzer_workdir: Option<PathBuf>,
    pub auth_username: String,
    pub auth_password: String,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            static_dir: "dist".to_string(),
            market_data: MarketDataConfig::default(),
            signal_ttl: DEFAULT_SIGNAL_TTL,
            cache_sweep_interval: Duration::from_secs(60),
            analyzer_cmd: "python3 python_backend/analyze_pair.py".to_string(),
            fallback_analyzer_cmd: "python3 python_backend/analyze_pair_dev.py".to_string(),
            analyzer_timeout: Some(Duration::from_secs(120)),
            analyzer_workdir: None,
            auth_username: DEMO_USERNAME.to_string(),
            auth_password: DEMO_PASSWORD.to_string(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            secure_cookies: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, falling back to defaults
    /// for unset keys.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = parse_or(&get, "NEXUS_LISTEN_ADDR", defaults.listen_addr)?;
        let cors_allow = match get("NEXUS_CORS_ALLOW_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_allow,
        };
        let timeout_ms: u64 = parse_or(&get, "NEXUS_REQUEST_TIMEOUT_MS", 30_000)?;
        let static_dir = get("NEXUS_STATIC_DIR").unwrap_or(defaults.static_dir);

        let price_ttl_secs: u64 =
            parse_or(&get, "NEXUS_PRICE_CACHE_TTL_SECS", DEFAULT_PRICE_TTL.as_secs())?;
        let signal_ttl_secs: u64 =
            parse_or(&get, "NEXUS_SIGNAL_CACHE_TTL_SECS", DEFAULT_SIGNAL_TTL.as_secs())?;
        let sweep_secs: u64 = parse_or(&get, "NEXUS_CACHE_SWEEP_INTERVAL_SECS", 60)?;
        if sweep_secs == 0 {
            anyhow::bail!("NEXUS_CACHE_SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let max_retries: u32 = parse_or(
            &get,
            "NEXUS_RATE_LIMIT_MAX_RETRIES",
            nexus_market_data::backoff::DEFAULT_MAX_RETRIES,
        )?;
        let market_data = MarketDataConfig {
            coingecko_base_url: get("NEXUS_COINGECKO_BASE_URL")
                .unwrap_or_else(|| coingecko::DEFAULT_BASE_URL.to_string()),
            binance_base_url: get("NEXUS_BINANCE_BASE_URL")
                .unwrap_or_else(|| binance::DEFAULT_BASE_URL.to_string()),
            price_ttl: Duration::from_secs(price_ttl_secs),
            backoff: BackoffConfig {
                max_retries: (max_retries > 0).then_some(max_retries),
                ..BackoffConfig::default()
            },
        };

        let analyzer_timeout_secs: u64 = parse_or(&get, "NEXUS_ANALYZER_TIMEOUT_SECS", 120)?;
        let session_ttl_hours: u64 = parse_or(&get, "NEXUS_SESSION_TTL_HOURS", 24)?;
        if session_ttl_hours == 0 {
            anyhow::bail!("NEXUS_SESSION_TTL_HOURS must be greater than zero");
        }

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            static_dir,
            market_data,
            signal_ttl: Duration::from_secs(signal_ttl_secs),
            cache_sweep_interval: Duration::from_secs(sweep_secs),
            analyzer_cmd: get("NEXUS_ANALYZER_CMD").unwrap_or(defaults.analyzer_cmd),
            fallback_analyzer_cmd: get("NEXUS_FALLBACK_ANALYZER_CMD")
                .unwrap_or(defaults.fallback_analyzer_cmd),
            analyzer_timeout: (analyzer_timeout_secs > 0)
                .then(|| Duration::from_secs(analyzer_timeout_secs)),
            analyzer_workdir: get("NEXUS_ANALYZER_WORKDIR").map(PathBuf::from),
            auth_username: get("NEXUS_AUTH_USERNAME").unwrap_or(defaults.auth_username),
            auth_password: get("NEXUS_AUTH_PASSWORD").unwrap_or(defaults.auth_password),
            session_ttl: Duration::from_secs(session_ttl_hours * 60 * 60),
            secure_cookies: parse_or(&get, "NEXUS_SECURE_COOKIES", false)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw}")),
        None => Ok(default),
    }
}
