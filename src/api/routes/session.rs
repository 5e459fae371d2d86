//! Session handlers.

use crate::api::AppState;
use crate::types::Session;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// POST /login - Run endpoint discovery and report the outcome
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "session",
    responses(
        (status = 200, description = "Login outcome, including the winning endpoint", body = crate::types::LoginResult)
    )
)]
pub async fn login(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.client.login().await)
}

/// POST /logout - End a session on the appliance (best effort)
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "session",
    request_body = crate::types::Session,
    responses(
        (status = 204, description = "Logout sent; failures are ignored")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Json(session): Json<Session>,
) -> impl IntoResponse {
    state.client.logout(&session).await;
    StatusCode::NO_CONTENT
}
