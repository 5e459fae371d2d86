//! NAS download-station client split into focused submodules.
//!
//! The `NasClient` struct and its methods are organized by concern:
//! - [`login`] - Session acquisition and logout
//! - [`submit`] - Task submission with one re-login on session expiry
//! - [`diagnostics`] - Read-only endpoint sweep and task listing
//! - [`magnet`] - Magnet links handed over without a target directory
//! - [`badge`] - Task counter shown after submissions

mod badge;
mod diagnostics;
mod login;
mod magnet;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use badge::TaskBadge;
pub use diagnostics::PROBED_ENDPOINTS;

use crate::config::{Config, ConfigUpdate};
use crate::error::Result;
use crate::store::ConfigStore;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::Event;
use std::sync::Arc;

/// Client for a NAS download station (cloneable - all fields are Arc-wrapped)
///
/// Holds no session between calls: every user action reads a fresh
/// configuration snapshot, logs in, and drops the session when done. Distinct
/// actions may run concurrently.
#[derive(Clone)]
pub struct NasClient {
    /// HTTP seam for every appliance call
    pub(crate) transport: Arc<dyn Transport>,
    /// Configuration provider, read at the start of each call
    pub(crate) store: Arc<dyn ConfigStore>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Counter of recently submitted tasks
    pub(crate) badge: TaskBadge,
}

impl NasClient {
    /// Create a client over an explicit transport
    pub fn new(store: Arc<dyn ConfigStore>, transport: Arc<dyn Transport>) -> Self {
        // Buffer sized for bursts of badge updates; slow subscribers see Lagged
        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);
        let badge = TaskBadge::new(event_tx.clone());

        Self {
            transport,
            store,
            event_tx,
            badge,
        }
    }

    /// Create a client using a reqwest transport built from the stored HTTP settings
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nas_magnet::{MemoryConfigStore, NasClient};
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = NasClient::from_store(Arc::new(MemoryConfigStore::default())).await?;
    ///
    ///     let result = client.submit("magnet:?xt=urn:btih:ABCDEF", 0).await;
    ///     println!("submitted: {}", result.ok);
    ///     Ok(())
    /// }
    /// ```
    pub async fn from_store(store: Arc<dyn ConfigStore>) -> Result<Self> {
        let config = store.read().await?;
        let transport = ReqwestTransport::new(&config.http)?;
        Ok(Self::new(store, Arc::new(transport)))
    }

    /// Subscribe to client events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration snapshot
    pub async fn config(&self) -> Result<Config> {
        self.store.read().await
    }

    /// Apply a partial configuration update through the store
    ///
    /// Emits [`Event::ConfigChanged`]; `directories_changed` tells menu owners
    /// to rebuild.
    pub async fn update_config(&self, update: ConfigUpdate) -> Result<Config> {
        let before = self.store.read().await?;
        let after = self.store.write(update).await?;
        let directories_changed = before.directories != after.directories;

        tracing::info!(directories_changed, "Configuration updated");
        self.emit_event(Event::ConfigChanged {
            directories_changed,
        });
        Ok(after)
    }

    /// Current task badge value (0 = cleared)
    pub fn badge_count(&self) -> u64 {
        self.badge.count()
    }

    /// Emit an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the local invocation API in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let client = self.clone();
        tokio::spawn(async move {
            let config = client.store.read().await?;
            crate::api::start_api_server(client, Arc::new(config.api)).await
        })
    }
}
