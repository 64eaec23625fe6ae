use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::{current_user, login, logout, require_session},
    config::Config,
    error::ApiError,
    main_lib::AppState,
};

mod analysis;
mod crypto;
mod health;
mod pairs;

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any);
    }

    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Renders a request timeout in the same `{error}` shape as other failures.
async fn timeout_as_error(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::Internal("Request timed out".to_string()).into_response();
    }
    response
}

/// Routes are split by whether they wait on upstream work. Price and
/// analysis routes are bounded by the retry budget and the analyzer timeout,
/// everything else by `request_timeout`.
pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), require_session);

    let protected_local = Router::new()
        .route("/auth/user", get(current_user))
        .merge(crypto::stats_router())
        .route_layer(gate.clone());

    let local = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(pairs::router())
        .merge(health::router())
        .merge(protected_local)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(middleware::map_response(timeout_as_error));

    let protected_upstream = Router::new()
        .merge(analysis::router())
        .merge(crypto::router())
        .route_layer(gate);

    let upstream = Router::new()
        .merge(crypto::public_router())
        .merge(protected_upstream);

    Router::new()
        .nest("/api", local.merge(upstream))
        .with_state(state)
        .layer(cors_layer(config))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}
