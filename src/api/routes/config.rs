//! Configuration handlers.

use crate::api::AppState;
use crate::config::ConfigUpdate;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

/// GET /config - Get current config (secrets redacted)
#[utoipa::path(
    get,
    path = "/api/v1/config",
    tag = "config",
    responses(
        (status = 200, description = "Current configuration", body = crate::config::Config),
        (status = 500, description = "Configuration could not be read", body = crate::error::ApiError)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Response {
    match state.client.config().await {
        Ok(config) => Json(config.redacted()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PATCH /config - Update config
#[utoipa::path(
    patch,
    path = "/api/v1/config",
    tag = "config",
    request_body(content = crate::config::ConfigUpdate, description = "Fields to change"),
    responses(
        (status = 200, description = "Configuration updated", body = crate::config::Config),
        (status = 500, description = "Configuration could not be saved", body = crate::error::ApiError)
    )
)]
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<ConfigUpdate>,
) -> Response {
    match state.client.update_config(update).await {
        Ok(config) => Json(config.redacted()).into_response(),
        Err(e) => e.into_response(),
    }
}
