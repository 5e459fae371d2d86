//! # nas-magnet
//!
//! Push magnet links to a NAS download station.
//!
//! Download-station firmware differs in where its login endpoint lives and
//! what it calls the credential fields. The client discovers a working
//! combination on every user action, submits the task, and recovers once from
//! an expired session by logging in again.
//!
//! ## Overview
//!
//! - [`NasClient`] - login, submission, diagnostics and magnet hand-over
//! - [`resolver`] - the ordered table of login candidates and how a response is judged
//! - [`response`] - JSON and markup body parsing
//! - [`menu`] - context menu entries derived from the configured directories
//! - [`store`] - where the configuration lives
//! - [`api`] - local HTTP surface for a browser extension
//!
//! ## Quick Start
//!
//! ```no_run
//! use nas_magnet::{Config, DirectoryConfig, MemoryConfigStore, NasClient, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         server: ServerConfig {
//!             host: "192.168.1.20".to_string(),
//!             port: 8080,
//!             username: Some("admin".to_string()),
//!             password: Some("secret".to_string()),
//!         },
//!         directories: vec![DirectoryConfig::new("Movies", "Movies")],
//!         ..Default::default()
//!     };
//!
//!     let client = NasClient::from_store(Arc::new(MemoryConfigStore::new(config))).await?;
//!
//!     let mut events = client.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let result = client.submit("magnet:?xt=urn:btih:ABCDEF", 0).await;
//!     println!("accepted: {}", result.ok);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Local invocation API
pub mod api;
/// Download-station client (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Context menu model and reconciliation
pub mod menu;
/// Login candidate table and response classification
pub mod resolver;
/// Response body parsing
pub mod response;
/// Configuration storage
pub mod store;
/// HTTP transport seam
pub mod transport;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::{NasClient, PROBED_ENDPOINTS, TaskBadge};
pub use config::{ApiConfig, Config, ConfigUpdate, DirectoryConfig, ServerConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use menu::{MenuAction, MenuHost, MenuItem, MenuManager};
pub use resolver::{LoginCandidate, ParamScheme};
pub use store::{ConfigChange, ConfigStore, JsonFileConfigStore, MemoryConfigStore};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{
    EndpointProbe, Event, LoginResult, MagnetDisposition, Session, SubmissionRequest,
    SubmissionResult,
};

/// Serve the local API until SIGTERM or Ctrl+C.
///
/// Returns early with the server's error if it cannot bind or stops on its own.
///
/// # Example
///
/// ```no_run
/// use nas_magnet::{JsonFileConfigStore, NasClient, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = JsonFileConfigStore::open("nas-magnet.json").await?;
///     let client = Arc::new(NasClient::from_store(Arc::new(store)).await?);
///
///     run_with_shutdown(client).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(client: std::sync::Arc<NasClient>) -> Result<()> {
    run_until(client, shutdown_signal()).await
}

/// Serve the local API until `shutdown` completes
pub async fn run_until(
    client: std::sync::Arc<NasClient>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let api = std::sync::Arc::new(client.config().await?.api);

    tokio::select! {
        result = api::start_api_server(client, api) => result,
        _ = shutdown => {
            tracing::info!("Relay shutting down");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("SIGTERM received"),
                    _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received"),
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "SIGTERM handler unavailable, Ctrl+C only"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl+C, relay runs until killed");
        std::future::pending::<()>().await;
    }
}
