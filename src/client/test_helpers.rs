//! Shared test helpers: a scripted transport and ready-made clients.

use crate::client::NasClient;
use crate::config::{Config, DirectoryConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::store::MemoryConfigStore;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub(crate) const MAGNET: &str = "magnet:?xt=urn:btih:ABCDEF";
pub(crate) const LOGIN_PATH: &str = "/downloadstation/V4/Misc/Login";
pub(crate) const ADD_URL_PATH: &str = "/downloadstation/V4/Task/AddUrl";
pub(crate) const AUTH_LOGIN_PATH: &str = "/cgi-bin/authLogin.cgi";

#[derive(Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Default)]
struct Route {
    once: VecDeque<Scripted>,
    sticky: Option<Scripted>,
}

/// Transport answering from a per-path script and recording every request
///
/// One-shot responses are consumed first, then the sticky one repeats.
/// Paths with no script answer 404 with an empty body.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer every request to `path` with this response
    pub(crate) fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .sticky = Some(Scripted::Respond(HttpResponse::new(status, body)));
    }

    /// Answer the next request to `path` with this response
    pub(crate) fn respond_once(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .once
            .push_back(Scripted::Respond(HttpResponse::new(status, body)));
    }

    /// Fail every request to `path` at the transport level
    pub(crate) fn fail(&self, path: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .sticky = Some(Scripted::Fail(message.to_string()));
    }

    /// Fail the next request to `path` at the transport level
    pub(crate) fn fail_once(&self, path: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .once
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Every request sent so far, in order
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to one path
    pub(crate) fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| path_of(&request.url) == path)
            .collect()
    }
}

fn path_of(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let path = path_of(&request.url);
        self.requests.lock().unwrap().push(request);

        let scripted = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .get_mut(&path)
                .and_then(|route| route.once.pop_front().or_else(|| route.sticky.clone()))
        };

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(Error::Network(message)),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

/// 10.0.0.5:8080, credentials u/p, a single Movies directory
pub(crate) fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "10.0.0.5".to_string(),
            port: 8080,
            username: Some("u".to_string()),
            password: Some("p".to_string()),
        },
        directories: vec![DirectoryConfig::new("Movies", "Movies")],
        ..Default::default()
    }
}

/// Same as [`test_config`] but without credentials
pub(crate) fn anonymous_config() -> Config {
    let mut config = test_config();
    config.server.username = None;
    config.server.password = None;
    config
}

/// Client over a memory store holding `config` and a fresh fake transport
pub(crate) fn create_test_client(config: Config) -> (NasClient, Arc<FakeTransport>) {
    let transport = FakeTransport::new();
    let store = Arc::new(MemoryConfigStore::new(config));
    let client = NasClient::new(store, transport.clone());
    (client, transport)
}
