//! Application state for the API server

use crate::NasClient;
use crate::config::ApiConfig;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; both fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// The client every handler delegates to
    pub client: Arc<NasClient>,

    /// API settings the router was built with
    pub api: Arc<ApiConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(client: Arc<NasClient>, api: Arc<ApiConfig>) -> Self {
        Self { client, api }
    }
}
