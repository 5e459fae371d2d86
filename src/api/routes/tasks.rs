//! Submission and task handlers.

use super::{MagnetRequest, SubmitRequest};
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// POST /submit - Send a magnet link to one configured directory
///
/// Always answers 200: the body's `ok` flag says whether the appliance
/// accepted the task and `code` says why not.
#[utoipa::path(
    post,
    path = "/api/v1/submit",
    tag = "tasks",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Submission outcome", body = crate::types::SubmissionResult)
    )
)]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    let result = state
        .client
        .submit(&request.magnet_uri, request.directory_index)
        .await;
    (StatusCode::OK, Json(result))
}

/// POST /magnet - Handle a clicked magnet link without a chosen directory
#[utoipa::path(
    post,
    path = "/api/v1/magnet",
    tag = "tasks",
    request_body = MagnetRequest,
    responses(
        (status = 200, description = "Whether the link was sent or should be copied", body = crate::types::MagnetDisposition)
    )
)]
pub async fn handle_magnet(
    State(state): State<AppState>,
    Json(request): Json<MagnetRequest>,
) -> impl IntoResponse {
    Json(state.client.handle_magnet(&request.magnet_uri).await)
}

/// GET /tasks - Raw task list from the appliance
///
/// JSON bodies are passed through as JSON, anything else as plain text.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "Task list as returned by the appliance"),
        (status = 400, description = "Appliance address not configured", body = crate::error::ApiError),
        (status = 502, description = "Appliance unreachable or rejected the query", body = crate::error::ApiError)
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> Response {
    match state.client.query_tasks().await {
        Ok(body) => match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => Json(json).into_response(),
            Err(_) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response(),
        },
        Err(e) => e.into_response(),
    }
}
