//! API key middleware
//!
//! When [`ApiConfig::api_key`](crate::config::ApiConfig::api_key) is set,
//! every request except `GET /health` must carry the key in `X-Api-Key`.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header the browser extension sends the key in
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `X-Api-Key` header does not match the configured key
///
/// ```no_run
/// use axum::{Router, middleware};
/// use nas_magnet::api::auth::require_api_key;
///
/// let router: Router = Router::new().layer(middleware::from_fn_with_state(
///     Some("secret-key-123".to_string()),
///     require_api_key,
/// ));
/// ```
pub async fn require_api_key(
    State(expected_api_key): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected_key) = expected_api_key else {
        return next.run(request).await;
    };

    // Liveness probes stay open so the extension can tell "down" from "locked"
    if request.method() == Method::GET && request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected_key.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with wrong API key");
            ApiError::unauthorized("Invalid API key").into_response()
        }
        None => ApiError::unauthorized("Missing X-Api-Key header").into_response(),
    }
}

/// Compare all bytes regardless of where the first mismatch is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
