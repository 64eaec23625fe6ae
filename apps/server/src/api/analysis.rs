use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use nexus_analysis::{SignalReport, DEFAULT_TIMEFRAME};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct AnalyzeRequest {
    pair: Option<String>,
    timeframe: Option<String>,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<SignalReport>> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let pair = body
        .pair
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Trading pair is required".to_string()))?;
    let timeframe = body
        .timeframe
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());

    let report = state
        .signals
        .analyze(&pair, &timeframe)
        .await
        .map_err(|e| {
            if e.is_client_error() {
                ApiError::BadRequest(e.to_string())
            } else {
                ApiError::upstream("Failed to analyze trading pair", e)
            }
        })?;

    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze))
}
