//! `RateLimitError` -> HTTP response, per the status mapping in the design.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rl_core::RateLimitError;
use serde_json::json;

/// Newtype so `rl-server` can implement `IntoResponse` for `rl_core`'s error
/// type without violating the orphan rule.
pub struct ApiError(pub RateLimitError);

impl From<RateLimitError> for ApiError {
    fn from(e: RateLimitError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_maps_to_400() {
        let resp = ApiError(RateLimitError::InvalidRequest("bad".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_contention_maps_to_503() {
        let resp = ApiError(RateLimitError::StoreContention).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn no_policy_maps_to_500() {
        let resp = ApiError(RateLimitError::NoPolicy).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
