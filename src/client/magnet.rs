//! Magnet links arriving from user clicks: direct hand-over and menu entries.

use crate::error::{Error, Result};
use crate::menu::{MenuAction, MenuItem, desired_menu};
use crate::types::{MagnetDisposition, SubmissionRequest};

use super::NasClient;

impl NasClient {
    /// Decide what to do with a magnet link the user clicked
    ///
    /// With auto-send off the caller is told to copy the link to the
    /// clipboard. With it on, the link goes to the first usable directory; if
    /// there is none, or the submission fails, the caller falls back to
    /// copying and the reason says why.
    pub async fn handle_magnet(&self, magnet_uri: &str) -> MagnetDisposition {
        let copy = |reason: Option<String>| MagnetDisposition::CopyToClipboard {
            magnet_uri: magnet_uri.to_string(),
            reason,
        };

        let config = match self.store.read().await {
            Ok(config) => config,
            Err(e) => return copy(Some(e.to_string())),
        };

        if !config.auto_send {
            tracing::debug!("Auto-send disabled, handing link back for the clipboard");
            return copy(None);
        }

        let Some((_, directory)) = config.usable_directories().next() else {
            tracing::warn!("Auto-send enabled but no usable directory configured");
            return copy(Some("no usable download directory configured".to_string()));
        };
        let directory = directory.clone();

        let result = self
            .submit_request(
                &config,
                SubmissionRequest {
                    magnet_uri: magnet_uri.to_string(),
                    target_directory: directory.clone(),
                },
            )
            .await;

        if result.ok {
            MagnetDisposition::Submitted {
                directory: directory.name,
            }
        } else {
            copy(result.reason)
        }
    }

    /// Menu entries for the current configuration
    pub async fn menus(&self) -> Result<Vec<MenuItem>> {
        let config = self.store.read().await?;
        Ok(desired_menu(&config))
    }

    /// Act on a clicked menu entry
    ///
    /// The copy entry and any failed submission hand the link back for the
    /// clipboard; a directory entry submits to that directory. Ids that are not
    /// actions (the parent entry, separators, unknown ids) are a configuration
    /// error.
    pub async fn handle_menu_click(
        &self,
        menu_id: &str,
        magnet_uri: &str,
    ) -> Result<MagnetDisposition> {
        let action = MenuAction::from_id(menu_id).ok_or_else(|| {
            Error::config(format!("'{}' is not a menu action", menu_id), "menu_id")
        })?;

        match action {
            MenuAction::CopyLink => Ok(MagnetDisposition::CopyToClipboard {
                magnet_uri: magnet_uri.to_string(),
                reason: None,
            }),
            MenuAction::SendToDirectory(index) => {
                let config = self.store.read().await?;
                match self.submit_indexed(&config, magnet_uri, index).await {
                    (result, Some(directory)) if result.ok => Ok(MagnetDisposition::Submitted {
                        directory: directory.name,
                    }),
                    (result, _) => Ok(MagnetDisposition::CopyToClipboard {
                        magnet_uri: magnet_uri.to_string(),
                        reason: result.reason,
                    }),
                }
            }
        }
    }
}
