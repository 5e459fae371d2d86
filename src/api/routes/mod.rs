//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Submissions, magnet hand-over, task listing
//! - [`session`] - Login and logout
//! - [`config`] - Configuration
//! - [`menus`] - Context menu entries and clicks
//! - [`system`] - Health, endpoint sweep, events, OpenAPI

use serde::{Deserialize, Serialize};

mod config;
mod menus;
mod session;
mod system;
mod tasks;

pub use config::*;
pub use menus::*;
pub use session::*;
pub use system::*;
pub use tasks::*;

/// Request body for POST /submit
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitRequest {
    /// The magnet URI, passed through unchanged
    pub magnet_uri: String,
    /// Index into the configured directory list
    pub directory_index: usize,
}

/// Request body for POST /magnet
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MagnetRequest {
    /// The clicked magnet URI
    pub magnet_uri: String,
}

/// Request body for POST /menus/click
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MenuClickRequest {
    /// Id of the clicked menu entry
    pub menu_id: String,
    /// The magnet URI the menu was opened on
    pub magnet_uri: String,
}
