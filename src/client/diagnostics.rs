//! Read-only diagnostics: endpoint sweep and task listing.

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::transport::HttpRequest;
use crate::types::EndpointProbe;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::collections::BTreeMap;

use super::NasClient;

/// Task listing endpoint
pub(crate) const TASK_QUERY_PATH: &str = "/downloadstation/V4/Task/Query";

/// Endpoints probed by [`NasClient::test_endpoints`], in order
pub const PROBED_ENDPOINTS: &[&str] = &[
    "/downloadstation/V4/Task/Query",
    "/downloadstation/V4/Task/AddUrl",
    "/downloadstation/V4/Task/Add",
    "/downloadstation/V3/Task/Query",
    "/downloadstation/V3/Task/AddUrl",
];

/// Characters of the body kept in a probe preview
const PREVIEW_CHARS: usize = 200;

fn require_host(config: &Config) -> Result<&ServerConfig> {
    if config.server.host.trim().is_empty() {
        return Err(Error::config("server address not configured", "server.host"));
    }
    Ok(&config.server)
}

/// GET with HTTP Basic credentials when both are configured
fn authorized_get(server: &ServerConfig, path: &str) -> HttpRequest {
    let request = HttpRequest::get(format!("{}{}", server.base_url(), path));
    match server.credentials() {
        Some((username, password)) => {
            let encoded = BASE64.encode(format!("{}:{}", username, password));
            request.header("Authorization", format!("Basic {}", encoded))
        }
        None => request,
    }
}

fn preview(body: &str) -> String {
    let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

impl NasClient {
    /// Probe the known download-station endpoints
    ///
    /// Sends one GET per entry of [`PROBED_ENDPOINTS`], sequentially, and
    /// reports what each answered. Only an unusable configuration is an error;
    /// per-endpoint failures are recorded in the map.
    pub async fn test_endpoints(&self) -> Result<BTreeMap<String, EndpointProbe>> {
        let config = self.store.read().await?;
        let server = require_host(&config)?;

        let mut results = BTreeMap::new();
        for path in PROBED_ENDPOINTS {
            let probe = match self.transport.send(authorized_get(server, path)).await {
                Ok(response) => {
                    let ok = response.is_success();
                    EndpointProbe {
                        status: Some(response.status),
                        status_text: response.status_text().map(str::to_string),
                        ok,
                        response: ok.then(|| preview(&response.body)),
                        error: None,
                    }
                }
                Err(e) => EndpointProbe {
                    status: None,
                    status_text: None,
                    ok: false,
                    response: None,
                    error: Some(e.to_string()),
                },
            };

            tracing::debug!(endpoint = %path, status = ?probe.status, ok = probe.ok, "Endpoint probed");
            results.insert((*path).to_string(), probe);
        }

        Ok(results)
    }

    /// Raw task listing from the download station
    ///
    /// A non-success status is an error carrying the status.
    pub async fn query_tasks(&self) -> Result<String> {
        let config = self.store.read().await?;
        let server = require_host(&config)?;

        let response = self
            .transport
            .send(authorized_get(server, TASK_QUERY_PATH))
            .await?;

        if !response.is_success() {
            return Err(Error::ApplianceRejected {
                code: None,
                reason: response.status_text().map(str::to_string),
                status: response.status,
            });
        }

        tracing::debug!(bytes = response.body.len(), "Task listing received");
        Ok(response.body)
    }
}
