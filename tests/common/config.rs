//! Live appliance configuration loaded from .env

use nas_magnet::{Config, DirectoryConfig, ServerConfig};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError(format!("{} not set in environment", name)))
}

/// Load the appliance configuration from environment variables
///
/// Required environment variables:
/// - `NAS_HOST` - Appliance host or IP
/// - `NAS_USERNAME` - Login user name
/// - `NAS_PASSWORD` - Login password
///
/// Optional environment variables:
/// - `NAS_PORT` - HTTP port (default: 8080)
/// - `NAS_DIRECTORY` - Move destination for test tasks (default: "Download")
pub fn load_live_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let port: u16 = std::env::var("NAS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let directory = std::env::var("NAS_DIRECTORY").unwrap_or_else(|_| "Download".to_string());

    Ok(Config {
        server: ServerConfig {
            host: required("NAS_HOST")?,
            port,
            username: Some(required("NAS_USERNAME")?),
            password: Some(required("NAS_PASSWORD")?),
        },
        directories: vec![DirectoryConfig::new("Live test", directory)],
        ..Default::default()
    })
}

/// Whether the live appliance variables are present
pub fn has_live_credentials() -> bool {
    load_live_config().is_ok()
}
