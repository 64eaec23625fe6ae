#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use nexus_analysis::{AnalysisError, SignalReport, SignalServiceTrait};
use nexus_market_data::{
    MarketDataError, MarketDataServiceTrait, OhlcCandle, PriceMap, ResponseCache,
};
use nexus_server::{
    api::app_router,
    auth::{CredentialVerifier, SessionStore, StaticCredentials},
    config::Config,
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
pub struct StubMarketData {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

#[async_trait]
impl MarketDataServiceTrait for StubMarketData {
    async fn get_current_prices(&self, ids: &[String]) -> Result<PriceMap, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock().unwrap() = ids.to_vec();
        if self.fail {
            return Err(MarketDataError::AllProvidersFailed);
        }
        let prices = ids
            .iter()
            .map(|id| (id.clone(), json!({"usd": 50000.5, "usd_24h_change": 1.25})))
            .collect::<serde_json::Map<_, _>>();
        Ok(serde_json::from_value(Value::Object(prices)).unwrap())
    }

    async fn get_historical_data(
        &self,
        id: &str,
        days: u32,
    ) -> Result<Vec<OhlcCandle>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock().unwrap() = vec![format!("{id}:{days}")];
        if self.fail {
            return Err(MarketDataError::SymbolNotFound(id.to_string()));
        }
        Ok(serde_json::from_value(json!([[1700000000000_i64, 1.0, 2.0, 0.5, 1.5]])).unwrap())
    }
}

#[derive(Default)]
pub struct StubSignals {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last: Mutex<Option<(String, String)>>,
}

#[async_trait]
impl SignalServiceTrait for StubSignals {
    async fn analyze(&self, pair: &str, timeframe: &str) -> nexus_analysis::Result<SignalReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((pair.to_string(), timeframe.to_string()));
        if self.fail {
            return Err(AnalysisError::AllAnalyzersFailed {
                attempts: 2,
                last_error: "python exploded".to_string(),
            });
        }
        Ok(serde_json::from_value(json!({
            "pair": pair,
            "timeframe": timeframe,
            "signal": "BUY",
            "confidence": 80,
            "timestamp": "2024-05-01T12:00:00",
            "reason": "stub",
            "last_price": 50000.5,
            "indicators": {"rsi": 31.0},
            "data_source": "stub"
        }))
        .unwrap())
    }
}

pub struct TestApp {
    pub router: Router,
    pub market_data: Arc<StubMarketData>,
    pub signals: Arc<StubSignals>,
    pub cache: Arc<ResponseCache>,
}

/// Router over arbitrary services, with default configuration.
pub fn router_with(
    market_data: Arc<dyn MarketDataServiceTrait>,
    signals: Arc<dyn SignalServiceTrait>,
    credentials: Arc<dyn CredentialVerifier>,
    cache: Arc<ResponseCache>,
) -> Router {
    let config = Config::default();
    let state = Arc::new(AppState {
        market_data,
        signals,
        cache,
        sessions: Arc::new(SessionStore::new(config.session_ttl)),
        credentials,
        secure_cookies: false,
    });
    app_router(state, &config)
}

pub fn build_app(market_data: StubMarketData, signals: StubSignals) -> TestApp {
    let market_data = Arc::new(market_data);
    let signals = Arc::new(signals);
    let cache = Arc::new(ResponseCache::new());

    TestApp {
        router: router_with(
            market_data.clone(),
            signals.clone(),
            Arc::new(StaticCredentials::demo()),
            cache.clone(),
        ),
        market_data,
        signals,
        cache,
    }
}

pub fn default_app() -> TestApp {
    build_app(StubMarketData::default(), StubSignals::default())
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in with the demo account and return the `Cookie` header value.
pub async fn login(router: &Router) -> String {
    let response = send(
        router,
        Method::POST,
        "/api/login",
        Some(json!({"username": "nexus_admin", "password": "nexus2024"})),
        None,
    )
    .await;
    assert_eq!(response.status(), 200);
    session_cookie_of(&response)
}

pub fn session_cookie_of(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}
