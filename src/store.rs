//! Configuration provider
//!
//! The client never owns its settings. It reads a snapshot from a
//! [`ConfigStore`] at the start of every call, so edits made through the store
//! apply to the next user action without a restart.

use crate::config::{Config, ConfigUpdate};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{RwLock, broadcast};

/// Notification sent to store subscribers after a successful write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigChange {
    /// Settings other than the directory list changed
    Updated,
    /// The directory list changed; menus need rebuilding
    DirectoriesChanged,
}

/// Persistent key-value store for the client configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current configuration snapshot
    async fn read(&self) -> Result<Config>;

    /// Apply a partial update and return the new configuration
    async fn write(&self, update: ConfigUpdate) -> Result<Config>;

    /// Receive a notification after every write
    fn subscribe(&self) -> broadcast::Receiver<ConfigChange>;
}

fn notify(tx: &broadcast::Sender<ConfigChange>, directories_changed: bool) {
    let change = if directories_changed {
        ConfigChange::DirectoriesChanged
    } else {
        ConfigChange::Updated
    };
    // No receivers is fine
    tx.send(change).ok();
}

/// In-memory store; contents are lost when dropped
pub struct MemoryConfigStore {
    config: RwLock<Config>,
    changes: broadcast::Sender<ConfigChange>,
}

impl MemoryConfigStore {
    /// Store holding `config`
    pub fn new(config: Config) -> Self {
        let (changes, _rx) = broadcast::channel(16);
        Self {
            config: RwLock::new(config),
            changes,
        }
    }
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn read(&self) -> Result<Config> {
        Ok(self.config.read().await.clone())
    }

    async fn write(&self, update: ConfigUpdate) -> Result<Config> {
        let mut config = self.config.write().await;
        let directories_changed = config.apply_update(update);
        let snapshot = config.clone();
        drop(config);

        notify(&self.changes, directories_changed);
        Ok(snapshot)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.changes.subscribe()
    }
}

/// Store persisting the whole configuration as a JSON file
///
/// The file is created with defaults on first use. Writes go to a sibling
/// temporary file which is then renamed over the original.
pub struct JsonFileConfigStore {
    path: PathBuf,
    config: RwLock<Config>,
    changes: broadcast::Sender<ConfigChange>,
}

impl JsonFileConfigStore {
    /// Open the store at `path`, creating it with defaults if it does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let config = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Configuration file not found, creating defaults");
                let config = Config::default();
                persist(&path, &config).await?;
                config
            }
            Err(e) => {
                return Err(Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to read configuration file '{}': {}",
                        path.display(),
                        e
                    ),
                )));
            }
        };

        let (changes, _rx) = broadcast::channel(16);
        Ok(Self {
            path,
            config: RwLock::new(config),
            changes,
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn persist(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn read(&self) -> Result<Config> {
        Ok(self.config.read().await.clone())
    }

    async fn write(&self, update: ConfigUpdate) -> Result<Config> {
        let mut config = self.config.write().await;
        let mut next = config.clone();
        let directories_changed = next.apply_update(update);

        // Only swap in the new value once it is on disk
        persist(&self.path, &next).await?;
        *config = next.clone();
        drop(config);

        tracing::debug!(path = %self.path.display(), directories_changed, "Configuration saved");
        notify(&self.changes, directories_changed);
        Ok(next)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.changes.subscribe()
    }
}
