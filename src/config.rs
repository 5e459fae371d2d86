//! Configuration types for nas-magnet

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use utoipa::ToSchema;

/// Appliance connection settings (address and credentials)
///
/// Credentials are optional: without them the pipeline submits tasks with no
/// session, which the appliance may reject. Empty strings count as absent.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Appliance host or IP address (default: "172.28.1.250")
    #[serde(default = "default_host")]
    pub host: String,

    /// Appliance HTTP port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user name
    #[serde(default)]
    pub username: Option<String>,

    /// Login password (stored as given; encoded per request where the API wants it)
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
        }
    }
}

impl ServerConfig {
    /// Base URL of the appliance, e.g. `http://10.0.0.5:8080`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host.trim(), self.port)
    }

    /// Username and password, if both are present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

/// A named target directory on the appliance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryConfig {
    /// Display name (e.g., "Movies")
    #[serde(default)]
    pub name: String,

    /// Folder passed verbatim as the appliance's move destination (e.g., "Movies")
    #[serde(default)]
    pub path: String,
}

impl DirectoryConfig {
    /// Create a directory entry
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Entries with an empty name or path are never offered or submitted
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty() && !self.path.is_empty()
    }
}

/// HTTP client settings for appliance calls
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: none, the client default applies)
    #[serde(default, with = "optional_duration_serde")]
    #[schema(value_type = Option<u64>)]
    pub timeout: Option<Duration>,
}

/// Task badge behaviour
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BadgeConfig {
    /// How long the task counter stays visible after the last submission (default: 2 seconds)
    #[serde(default = "default_badge_reset", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub reset_after: Duration,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            reset_after: default_badge_reset(),
        }
    }
}

/// Local invocation API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for extension access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for NasClient
///
/// The client treats this as a read-only snapshot for the duration of a call;
/// changes go through a [`ConfigStore`](crate::store::ConfigStore).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Appliance address and credentials
    #[serde(default)]
    pub server: ServerConfig,

    /// Submit magnet links handed to the client directly (default: true);
    /// when false they are returned for copying to the clipboard instead
    #[serde(default = "default_true")]
    pub auto_send: bool,

    /// Ordered target directories offered in menus
    #[serde(default = "default_directories")]
    pub directories: Vec<DirectoryConfig>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Task badge settings
    #[serde(default)]
    pub badge: BadgeConfig,

    /// Local API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auto_send: true,
            directories: default_directories(),
            http: HttpConfig::default(),
            badge: BadgeConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Directories with a non-empty name and path, with their original indices
    pub fn usable_directories(&self) -> impl Iterator<Item = (usize, &DirectoryConfig)> {
        self.directories
            .iter()
            .enumerate()
            .filter(|(_, dir)| dir.is_usable())
    }

    /// Apply a partial update; returns true if the directory list changed
    pub fn apply_update(&mut self, update: ConfigUpdate) -> bool {
        if let Some(host) = update.server_host {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = update.server_port {
            self.server.port = port;
        }
        if let Some(username) = update.username {
            self.server.username = username;
        }
        if let Some(password) = update.password {
            self.server.password = password;
        }
        if let Some(auto_send) = update.auto_send {
            self.auto_send = auto_send;
        }
        match update.directories {
            Some(directories) if directories != self.directories => {
                self.directories = directories;
                true
            }
            _ => false,
        }
    }

    /// Copy of the configuration with secrets replaced, for display
    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if redacted.server.password.is_some() {
            redacted.server.password = Some("***REDACTED***".to_string());
        }
        if redacted.api.api_key.is_some() {
            redacted.api.api_key = Some("***REDACTED***".to_string());
        }
        redacted
    }
}

/// Partial configuration update
///
/// Only the fields present are changed. Credentials are cleared by sending an
/// empty string, which [`ServerConfig::credentials`] treats as absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ConfigUpdate {
    /// New appliance host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_host: Option<String>,

    /// New appliance port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,

    /// New user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Option<String>>,

    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Option<String>>,

    /// New auto-send flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_send: Option<bool>,

    /// Replacement directory list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<DirectoryConfig>>,
}

fn default_host() -> String {
    "172.28.1.250".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_directories() -> Vec<DirectoryConfig> {
    vec![
        DirectoryConfig::new("Downloads", "Download"),
        DirectoryConfig::new("Movies", "Movies"),
    ]
}

fn default_badge_reset() -> Duration {
    Duration::from_secs(2)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6789))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
