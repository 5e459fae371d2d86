//! OpenAPI documentation for the local invocation API

use utoipa::OpenApi;

/// OpenAPI documentation for the nas-magnet API
///
/// Served at `/api/v1/openapi.json` and, when enabled, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "nas-magnet local API",
        version = "0.1.0",
        description = "Hands magnet links from a browser extension to a NAS download station",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6789/api/v1", description = "Local relay")
    ),
    paths(
        // Tasks
        crate::api::routes::submit,
        crate::api::routes::handle_magnet,
        crate::api::routes::list_tasks,

        // Session
        crate::api::routes::login,
        crate::api::routes::logout,

        // Configuration
        crate::api::routes::get_config,
        crate::api::routes::update_config,

        // Menus
        crate::api::routes::list_menus,
        crate::api::routes::click_menu,

        // System
        crate::api::routes::health_check,
        crate::api::routes::test_endpoints,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::Session,
        crate::types::LoginResult,
        crate::types::SubmissionRequest,
        crate::types::SubmissionResult,
        crate::types::EndpointProbe,
        crate::types::MagnetDisposition,
        crate::types::Event,

        crate::resolver::ParamScheme,
        crate::resolver::LoginCandidate,

        crate::menu::MenuItem,
        crate::menu::MenuItemKind,

        crate::config::Config,
        crate::config::ConfigUpdate,
        crate::config::ServerConfig,
        crate::config::DirectoryConfig,
        crate::config::HttpConfig,
        crate::config::BadgeConfig,
        crate::config::ApiConfig,

        crate::api::routes::SubmitRequest,
        crate::api::routes::MagnetRequest,
        crate::api::routes::MenuClickRequest,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Send magnet links to the appliance and list its tasks"),
        (name = "session", description = "Log in and out of the download station"),
        (name = "config", description = "Read and change the stored configuration"),
        (name = "menus", description = "Context menu entries for magnet links"),
        (name = "system", description = "Health, endpoint sweep, events, OpenAPI"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the X-Api-Key scheme to the generated document
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
