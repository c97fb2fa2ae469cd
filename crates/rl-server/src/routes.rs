//! Route handlers: `GET /health` and `POST /rate-limit/check`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use rl_core::{Decision, RequestContext};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn check_rate_limit(
    State(state): State<AppState>,
    Json(ctx): Json<RequestContext>,
) -> Result<Json<Decision>, ApiError> {
    let decision =
        rl_limiter::decide_request(&ctx, state.catalog.as_ref(), state.store.as_ref()).await?;
    Ok(Json(decision))
}

pub fn router(state: AppState) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .route("/health", get(health))
        .route("/rate-limit/check", post(check_rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
