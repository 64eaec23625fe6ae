//! Signal service.
//!
//! Caches reports per `(pair, timeframe)` in the shared response cache and
//! walks the analyzer list until one produces a report.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use nexus_market_data::{ResponseCache, DEFAULT_SIGNAL_TTL};

use crate::analyzer::SignalAnalyzer;
use crate::errors::{AnalysisError, Result};
use crate::report::SignalReport;

const CACHE_KEY_PREFIX: &str = "signal";

#[async_trait]
pub trait SignalServiceTrait: Send + Sync {
    /// Signal report for `pair` on `timeframe`, cached for the signal TTL.
    async fn analyze(&self, pair: &str, timeframe: &str) -> Result<SignalReport>;
}

pub struct SignalService {
    analyzers: Vec<Arc<dyn SignalAnalyzer>>,
    cache: Arc<ResponseCache>,
    ttl: Duration,
}

impl SignalService {
    /// `analyzers` are tried in the given order.
    pub fn new(analyzers: Vec<Arc<dyn SignalAnalyzer>>, cache: Arc<ResponseCache>) -> Self {
        Self {
            analyzers,
            cache,
            ttl: DEFAULT_SIGNAL_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache_key(pair: &str, timeframe: &str) -> String {
        format!("{}:{}:{}", CACHE_KEY_PREFIX, pair, timeframe)
    }

    fn cached(&self, key: &str) -> Option<SignalReport> {
        let value = self.cache.get_fresh(key)?;
        match serde_json::from_value(value) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Ignoring undecodable cached report '{}': {}", key, e);
                None
            }
        }
    }
}

fn normalize_pair(pair: &str) -> Result<String> {
    let pair = pair.trim().to_ascii_uppercase();
    if pair.is_empty() {
        return Err(AnalysisError::InvalidInput("pair is required".to_string()));
    }
    if !pair.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AnalysisError::InvalidInput(format!(
            "invalid trading pair '{}'",
            pair
        )));
    }
    Ok(pair)
}

fn normalize_timeframe(timeframe: &str) -> Result<String> {
    let timeframe = timeframe.trim();
    if timeframe.is_empty() || !timeframe.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AnalysisError::InvalidInput(format!(
            "invalid timeframe '{}'",
            timeframe
        )));
    }
    Ok(timeframe.to_string())
}

#[async_trait]
impl SignalServiceTrait for SignalService {
    async fn analyze(&self, pair: &str, timeframe: &str) -> Result<SignalReport> {
        let pair = normalize_pair(pair)?;
        let timeframe = normalize_timeframe(timeframe)?;
        let key = Self::cache_key(&pair, &timeframe);

        if let Some(report) = self.cached(&key) {
            debug!("Signal cache hit for {}", key);
            return Ok(report);
        }

        if self.analyzers.is_empty() {
            return Err(AnalysisError::NoAnalyzers);
        }

        let mut last_error: Option<AnalysisError> = None;

        for analyzer in &self.analyzers {
            match analyzer.analyze(&pair, &timeframe).await {
                Ok(report) => {
                    info!(
                        "Analyzer '{}' produced {} for {} {}",
                        analyzer.id(),
                        report.signal,
                        pair,
                        timeframe
                    );
                    match serde_json::to_value(&report) {
                        Ok(value) => self.cache.insert(key, value, self.ttl),
                        Err(e) => warn!("Signal report for {} not cached: {}", key, e),
                    }
                    return Ok(report);
                }
                Err(e) => {
                    warn!(
                        "Analyzer '{}' failed for {} {}: {}, trying next analyzer",
                        analyzer.id(),
                        pair,
                        timeframe,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(AnalysisError::AllAnalyzersFailed {
            attempts: self.analyzers.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_default(),
        })
    }
}
