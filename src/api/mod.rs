//! Local invocation API
//!
//! The browser extension (or any local tool) drives the client through this
//! HTTP surface instead of linking the library.

use crate::config::ApiConfig;
use crate::{NasClient, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `POST /submit` - Send a magnet link to a configured directory
/// - `POST /magnet` - Handle a clicked magnet link (auto-send or copy)
/// - `GET /tasks` - Task list as the appliance reports it
///
/// ## Session
/// - `POST /login` - Run endpoint discovery
/// - `POST /logout` - End a session
///
/// ## Configuration
/// - `GET /config` - Get current config (secrets redacted)
/// - `PATCH /config` - Update config
///
/// ## Menus
/// - `GET /menus` - Context menu entries
/// - `POST /menus/click` - Act on a clicked entry
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /endpoints/test` - Probe the known download-station endpoints
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(client: Arc<NasClient>, api: Arc<ApiConfig>) -> Router {
    let state = AppState::new(client, api.clone());

    let router = Router::new()
        // Tasks
        .route("/submit", post(routes::submit))
        .route("/magnet", post(routes::handle_magnet))
        .route("/tasks", get(routes::list_tasks))
        // Session
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        // Configuration
        .route("/config", get(routes::get_config))
        .route("/config", patch(routes::update_config))
        // Menus
        .route("/menus", get(routes::list_menus))
        .route("/menus/click", post(routes::click_menu))
        // System
        .route("/health", get(routes::health_check))
        .route("/endpoints/test", get(routes::test_endpoints))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // Swagger UI must be merged before state is applied
    let router = if api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    let router = if api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    // CORS is the outermost layer so preflight requests never hit the key check
    if api.cors_enabled {
        router.layer(build_cors_layer(&api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer for the configured origins ("*" or empty allows any)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let layer = if allow_any || origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };

    layer.allow_methods(Any).allow_headers(Any)
}

/// Start the API server on the configured bind address
///
/// Runs until the server stops or fails.
///
/// ```no_run
/// use nas_magnet::{MemoryConfigStore, NasClient};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(NasClient::from_store(Arc::new(MemoryConfigStore::default())).await?);
/// let api = Arc::new(client.config().await?.api);
///
/// nas_magnet::api::start_api_server(client, api).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(client: Arc<NasClient>, api: Arc<ApiConfig>) -> Result<()> {
    let bind_address = api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(client, api);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
