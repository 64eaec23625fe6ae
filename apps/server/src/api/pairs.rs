use std::sync::Arc;

use axum::{routing::get, Json, Router};
use nexus_analysis::SUPPORTED_TIMEFRAMES;
use nexus_market_data::supported_pairs;
use serde::Serialize;

use crate::main_lib::AppState;

const ENDPOINTS: &[&str] = &[
    "POST /api/login",
    "POST /api/logout",
    "GET /api/auth/user",
    "POST /api/analyze",
    "GET /api/crypto/prices",
    "GET /api/crypto/historical/{id}",
    "GET /api/crypto/cache-stats",
    "GET /api/pairs",
];

#[derive(Serialize)]
struct PairsResponse {
    pairs: Vec<&'static str>,
    timeframes: &'static [&'static str],
    endpoints: &'static [&'static str],
}

async fn list_pairs() -> Json<PairsResponse> {
    Json(PairsResponse {
        pairs: supported_pairs(),
        timeframes: SUPPORTED_TIMEFRAMES,
        endpoints: ENDPOINTS,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/pairs", get(list_pairs))
}
