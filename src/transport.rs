//! HTTP transport seam for appliance calls
//!
//! Everything that talks to the appliance goes through [`Transport`], so the
//! login brute force and the submission state machine can be exercised with a
//! scripted fake instead of a live NAS. [`ReqwestTransport`] is the real one.

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;

/// HTTP method used for appliance calls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Parameters travel in the query string
    Get,
    /// Parameters travel as a form-encoded body
    Post,
}

/// A request to the appliance
///
/// `params` are sent as the query string for GET and as an
/// `application/x-www-form-urlencoded` body for POST.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Ordered request parameters
    pub params: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// GET request with no parameters
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// POST request with no parameters
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Append a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first parameter with this name
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first header with this name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parameters encoded as `a=1&b=2`
    pub fn encoded_params(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// An appliance response, body read to text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Build a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Canonical reason phrase for the status, e.g. "Not Found"
    pub fn status_text(&self) -> Option<&'static str> {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
    }
}

/// Sends requests to the appliance
///
/// Implementations report transport-level failures (refused connection,
/// timeout) as [`Error::Network`]; any HTTP status, including 404 and 5xx, is
/// a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and read the whole body
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the HTTP settings
    ///
    /// No timeout is set unless `config.timeout` is.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => {
                let mut url = url::Url::parse(&request.url)?;
                if !request.params.is_empty() {
                    url.query_pairs_mut().extend_pairs(request.params.iter());
                }
                self.client.get(url)
            }
            Method::Post => {
                let builder = self.client.post(&request.url).body(request.encoded_params());
                if request.header_value("content-type").is_none() {
                    builder.header(
                        "Content-Type",
                        "application/x-www-form-urlencoded; charset=UTF-8",
                    )
                } else {
                    builder
                }
            }
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}
