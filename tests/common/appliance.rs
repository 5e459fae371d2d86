//! A download station simulated with wiremock

use nas_magnet::{Config, DirectoryConfig, MemoryConfigStore, NasClient, ServerConfig};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MAGNET: &str = "magnet:?xt=urn:btih:0123456789ABCDEF&dn=Big+Buck+Bunny";
pub const LOGIN_PATH: &str = "/downloadstation/V4/Misc/Login";
pub const ADD_URL_PATH: &str = "/downloadstation/V4/Task/AddUrl";
pub const AUTH_LOGIN_PATH: &str = "/cgi-bin/authLogin.cgi";

/// Configuration pointing at the mock server, credentials u/p, one Movies directory
pub fn config_for(server: &MockServer) -> Config {
    Config {
        server: ServerConfig {
            host: server.address().ip().to_string(),
            port: server.address().port(),
            username: Some("u".to_string()),
            password: Some("p".to_string()),
        },
        directories: vec![DirectoryConfig::new("Movies", "Movies")],
        ..Default::default()
    }
}

/// Client with a real reqwest transport over a memory store
pub async fn client_for(config: Config) -> NasClient {
    NasClient::from_store(Arc::new(MemoryConfigStore::new(config)))
        .await
        .unwrap()
}

/// Answer POSTs to `route` with `body`, forever
pub async fn mount_json(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Answer the next POST to `route` with `body`, once
pub async fn mount_json_once(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}
