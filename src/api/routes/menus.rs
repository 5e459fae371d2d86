//! Context menu handlers.

use super::MenuClickRequest;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

/// GET /menus - Entries the magnet-link context menu should show
#[utoipa::path(
    get,
    path = "/api/v1/menus",
    tag = "menus",
    responses(
        (status = 200, description = "Menu entries in display order", body = Vec<crate::menu::MenuItem>),
        (status = 500, description = "Configuration could not be read", body = crate::error::ApiError)
    )
)]
pub async fn list_menus(State(state): State<AppState>) -> Response {
    match state.client.menus().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /menus/click - Act on a clicked menu entry
#[utoipa::path(
    post,
    path = "/api/v1/menus/click",
    tag = "menus",
    request_body = MenuClickRequest,
    responses(
        (status = 200, description = "Whether the link was sent or should be copied", body = crate::types::MagnetDisposition),
        (status = 400, description = "Menu id is not an action", body = crate::error::ApiError)
    )
)]
pub async fn click_menu(
    State(state): State<AppState>,
    Json(request): Json<MenuClickRequest>,
) -> Response {
    match state
        .client
        .handle_menu_click(&request.menu_id, &request.magnet_uri)
        .await
    {
        Ok(disposition) => Json(disposition).into_response(),
        Err(e) => e.into_response(),
    }
}
