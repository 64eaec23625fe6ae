use std::sync::Arc;

use nexus_analysis::{ProcessAnalyzer, SignalAnalyzer, SignalService, SignalServiceTrait};
use nexus_market_data::{MarketDataService, MarketDataServiceTrait, ResponseCache};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    auth::{CredentialVerifier, SessionStore, StaticCredentials},
    config::Config,
};

pub struct AppState {
    pub market_data: Arc<dyn MarketDataServiceTrait>,
    pub signals: Arc<dyn SignalServiceTrait>,
    /// Shared by price responses and signal reports.
    pub cache: Arc<ResponseCache>,
    pub sessions: Arc<SessionStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub secure_cookies: bool,
}

pub fn init_tracing() {
    let log_format = std::env::var("NEXUS_LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_analyzers(config: &Config) -> anyhow::Result<Vec<Arc<dyn SignalAnalyzer>>> {
    let mut analyzers: Vec<Arc<dyn SignalAnalyzer>> = Vec::new();

    for (id, command_line) in [
        ("primary", &config.analyzer_cmd),
        ("fallback", &config.fallback_analyzer_cmd),
    ] {
        let mut analyzer = ProcessAnalyzer::from_command_line(id, command_line)?
            .with_timeout(config.analyzer_timeout);
        if let Some(ref workdir) = config.analyzer_workdir {
            analyzer = analyzer.with_workdir(workdir);
        }
        analyzers.push(Arc::new(analyzer));
    }

    Ok(analyzers)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let cache = Arc::new(ResponseCache::new());

    let market_data = Arc::new(MarketDataService::from_config(
        &config.market_data,
        cache.clone(),
    ));

    let signals = Arc::new(
        SignalService::new(build_analyzers(config)?, cache.clone()).with_ttl(config.signal_ttl),
    );

    let credentials = Arc::new(StaticCredentials::new(
        config.auth_username.clone(),
        config.auth_password.clone(),
    ));

    tracing::info!(
        "Price providers: {}",
        market_data
            .registry()
            .providers()
            .iter()
            .map(|p| p.id())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(Arc::new(AppState {
        market_data,
        signals,
        cache,
        sessions: Arc::new(SessionStore::new(config.session_ttl)),
        credentials,
        secure_cookies: config.secure_cookies,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_state_wires_shared_cache() {
        let state = build_state(&Config::default()).await.unwrap();
        assert!(state.cache.is_empty());
        assert!(state.sessions.is_empty());
        assert!(!state.secure_cookies);
    }

    #[test]
    fn empty_analyzer_command_is_rejected() {
        let config = Config {
            analyzer_cmd: "  ".to_string(),
            ..Config::default()
        };
        assert!(build_analyzers(&config).is_err());
    }
}
