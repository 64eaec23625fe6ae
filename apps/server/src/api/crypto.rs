use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use nexus_market_data::{OhlcCandle, PriceMap, DEFAULT_COIN_IDS};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

const DEFAULT_HISTORY_DAYS: u32 = 7;

#[derive(Deserialize)]
struct PricesQuery {
    ids: Option<String>,
}

#[derive(Deserialize)]
struct HistoricalQuery {
    days: Option<String>,
}

#[derive(Serialize)]
struct CacheStatsResponse {
    cache_size: usize,
    cached_keys: Vec<String>,
    timestamp: String,
}

/// Comma separated ids, or the default set when none are given.
fn parse_ids(raw: Option<&str>) -> Vec<String> {
    let ids: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|id| id.trim().to_ascii_lowercase())
        .filter(|id| !id.is_empty())
        .collect();

    if ids.is_empty() {
        DEFAULT_COIN_IDS.iter().map(|id| id.to_string()).collect()
    } else {
        ids
    }
}

fn parse_days(raw: Option<&str>) -> ApiResult<u32> {
    match raw.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(DEFAULT_HISTORY_DAYS),
        Some(days) => days
            .parse::<u32>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid days: {days}"))),
    }
}

async fn get_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricesQuery>,
) -> ApiResult<Json<PriceMap>> {
    let ids = parse_ids(query.ids.as_deref());
    let prices = state
        .market_data
        .get_current_prices(&ids)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch cryptocurrency prices", e))?;
    Ok(Json(prices))
}

async fn get_historical(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<HistoricalQuery>,
) -> ApiResult<Json<Vec<OhlcCandle>>> {
    let days = parse_days(query.days.as_deref())?;
    let candles = state
        .market_data
        .get_historical_data(&id, days)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch historical data", e))?;
    Ok(Json(candles))
}

async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats();
    Json(CacheStatsResponse {
        cache_size: stats.cache_size,
        cached_keys: stats.cached_keys,
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new().route("/crypto/prices", get(get_prices))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/crypto/historical/{id}", get(get_historical))
}

pub fn stats_router() -> Router<Arc<AppState>> {
    Router::new().route("/crypto/cache-stats", get(get_cache_stats))
}
