//! Context menu model and reconciliation
//!
//! The menu a user sees on a magnet link is derived from the configuration:
//! a copy entry, a separator, and one "Download to" entry per usable
//! directory. [`desired_menu`] computes that list; [`MenuManager::ensure`]
//! brings a [`MenuHost`] in line with it, touching only what differs, so it can
//! be called after every configuration change.

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

/// Id of the parent entry grouping the magnet actions
pub const MENU_ROOT_ID: &str = "magnet_options";
/// Id of the copy entry
pub const COPY_LINK_ID: &str = "copy_magnet_link";
/// Id of the separator between copy and directory entries
pub const SEPARATOR_ID: &str = "separator_1";
/// Prefix of directory entry ids; the suffix is the directory index
pub const SEND_TO_DIRECTORY_PREFIX: &str = "send_to_directory_";
/// Links the magnet entries apply to
pub const MAGNET_LINK_PATTERN: &str = "magnet:*";

/// Kind of menu entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MenuItemKind {
    /// Clickable entry
    Normal,
    /// Visual separator
    Separator,
}

/// One context menu entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    /// Stable identifier reported back on click
    pub id: String,
    /// Entry kind
    pub kind: MenuItemKind,
    /// Label (absent for separators)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Parent entry id, for nested entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// URL pattern of links the entry is offered on
    pub link_pattern: String,
}

impl MenuItem {
    fn entry(id: impl Into<String>, title: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            kind: MenuItemKind::Normal,
            title: Some(title.into()),
            parent_id: parent_id.map(str::to_string),
            link_pattern: MAGNET_LINK_PATTERN.to_string(),
        }
    }

    fn separator(id: impl Into<String>, parent_id: &str) -> Self {
        Self {
            id: id.into(),
            kind: MenuItemKind::Separator,
            title: None,
            parent_id: Some(parent_id.to_string()),
            link_pattern: MAGNET_LINK_PATTERN.to_string(),
        }
    }
}

/// Menu entries for `config`, parents before children
///
/// Directories with an empty name or path are skipped; the remaining entries
/// keep their original index in the id.
pub fn desired_menu(config: &Config) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::entry(MENU_ROOT_ID, "Magnet Options", None),
        MenuItem::entry(COPY_LINK_ID, "Copy Magnet Link", Some(MENU_ROOT_ID)),
        MenuItem::separator(SEPARATOR_ID, MENU_ROOT_ID),
    ];

    items.extend(config.usable_directories().map(|(index, directory)| {
        MenuItem::entry(
            format!("{}{}", SEND_TO_DIRECTORY_PREFIX, index),
            format!("Download to: {}", directory.name),
            Some(MENU_ROOT_ID),
        )
    }));

    items
}

/// What a clicked menu entry asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "index", rename_all = "snake_case")]
pub enum MenuAction {
    /// Copy the link to the clipboard
    CopyLink,
    /// Submit the link to the directory at this index
    SendToDirectory(usize),
}

impl MenuAction {
    /// Parse a clicked entry id; `None` for the parent entry, separators and unknown ids
    pub fn from_id(id: &str) -> Option<Self> {
        if id == COPY_LINK_ID {
            return Some(MenuAction::CopyLink);
        }
        id.strip_prefix(SEND_TO_DIRECTORY_PREFIX)
            .and_then(|index| index.parse().ok())
            .map(MenuAction::SendToDirectory)
    }
}

/// The menu system entries are created in (e.g. a browser's context menu API)
#[async_trait]
pub trait MenuHost: Send + Sync {
    /// Create one entry; its parent, if any, already exists
    async fn create(&self, item: &MenuItem) -> Result<()>;

    /// Remove one entry
    async fn remove(&self, id: &str) -> Result<()>;

    /// Remove every entry this host holds
    async fn remove_all(&self) -> Result<()>;
}

/// Counts of changes made by one [`MenuManager::ensure`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuSync {
    /// Entries created
    pub created: usize,
    /// Entries removed
    pub removed: usize,
}

impl MenuSync {
    /// Nothing had to change
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.removed == 0
    }
}

/// Owns the set of entries created in a [`MenuHost`]
pub struct MenuManager<H> {
    host: H,
    created: BTreeMap<String, MenuItem>,
    /// Creation order, for child-first removal
    order: Vec<String>,
}

impl<H: MenuHost> MenuManager<H> {
    /// Manager tracking nothing yet
    pub fn new(host: H) -> Self {
        Self {
            host,
            created: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// The underlying host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Ids currently tracked as created, in creation order
    pub fn tracked_ids(&self) -> &[String] {
        &self.order
    }

    /// Make the host show exactly `desired`
    ///
    /// Entries that are gone or changed are removed (children first); missing
    /// or changed entries are created in `desired` order. Calling it twice with
    /// the same list makes no host calls the second time. An entry whose
    /// parent or any earlier sibling is being replaced is replaced too, so the
    /// host keeps `desired` order.
    pub async fn ensure(&mut self, desired: &[MenuItem]) -> Result<MenuSync> {
        let mut sync = MenuSync::default();

        // Host appends new entries, so a sibling change invalidates everything after it
        let mut kept: BTreeSet<&str> = BTreeSet::new();
        let mut reordered: BTreeSet<Option<&str>> = BTreeSet::new();
        for item in desired {
            let parent = item.parent_id.as_deref();
            let unchanged = self.created.get(item.id.as_str()) == Some(item);
            let parent_kept = parent.is_none_or(|p| kept.contains(p));
            if unchanged && parent_kept && !reordered.contains(&parent) {
                kept.insert(item.id.as_str());
            } else {
                reordered.insert(parent);
            }
        }

        let mut stale: Vec<String> = self
            .order
            .iter()
            .filter(|id| !kept.contains(id.as_str()))
            .cloned()
            .collect();

        let positions: BTreeMap<&String, usize> =
            self.order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        stale.sort_by_key(|id| std::cmp::Reverse(positions.get(id).copied().unwrap_or(0)));

        for id in stale {
            self.host.remove(&id).await?;
            self.created.remove(&id);
            self.order.retain(|tracked| tracked != &id);
            sync.removed += 1;
            tracing::debug!(menu_id = %id, "Menu entry removed");
        }

        for item in desired {
            if self.created.contains_key(&item.id) {
                continue;
            }
            self.host.create(item).await?;
            self.created.insert(item.id.clone(), item.clone());
            self.order.push(item.id.clone());
            sync.created += 1;
            tracing::debug!(menu_id = %item.id, "Menu entry created");
        }

        if !sync.is_noop() {
            tracing::info!(
                created = sync.created,
                removed = sync.removed,
                "Context menu reconciled"
            );
        }
        Ok(sync)
    }

    /// Clear the host and forget everything tracked, then rebuild from `desired`
    pub async fn rebuild(&mut self, desired: &[MenuItem]) -> Result<MenuSync> {
        self.host.remove_all().await?;
        self.created.clear();
        self.order.clear();
        self.ensure(desired).await
    }
}
