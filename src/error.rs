//! Error types for nas-magnet
//!
//! This module provides error handling for the library, including:
//! - The appliance error taxonomy (credentials, discovery, session, rejection, transport)
//! - HTTP status code mapping for the local invocation API
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for nas-magnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nas-magnet
///
/// Every failure a submission can end in maps onto one of these variants. The
/// pipeline itself never returns them directly: it folds them into a
/// [`SubmissionResult`](crate::types::SubmissionResult) carrying
/// [`ToHttpStatus::error_code`] and the `Display` text.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "directories")
        key: Option<String>,
    },

    /// Username or password not configured
    #[error("missing credentials: username and password are required to log in")]
    MissingCredentials,

    /// Every login candidate (including the administration fallback) was exhausted
    #[error("no working login endpoint found on the appliance")]
    EndpointNotFound,

    /// Login was attempted and the appliance rejected it
    #[error("authentication failed: {}", describe(.reason, .code, None))]
    AuthFailed {
        /// Appliance error code, if one was reported
        code: Option<i64>,
        /// Appliance-provided reason, if any
        reason: Option<String>,
    },

    /// The download-management session expired mid-submission (code 5)
    #[error("session expired: {}", describe(.reason, &None, Some(.status)))]
    SessionExpired {
        /// Appliance-provided reason, if any
        reason: Option<String>,
        /// HTTP status of the rejected call
        status: u16,
    },

    /// The add-task call was rejected for a reason other than session expiry
    #[error("appliance rejected the task: {}", describe(.reason, .code, Some(.status)))]
    ApplianceRejected {
        /// Appliance error code, if one was reported
        code: Option<i64>,
        /// Appliance-provided reason, if any
        reason: Option<String>,
        /// HTTP status of the rejected call
        status: u16,
    },

    /// Transport-level failure (connection refused, timeout, bad URL)
    #[error("network error: {0}")]
    Network(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Network(error.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Config {
            message: format!("invalid appliance URL: {}", error),
            key: Some("server.host".to_string()),
        }
    }
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Combine the appliance's reason, error code and HTTP status into one string.
///
/// A reason of `"session error"` with status 200 gives `"session error (HTTP 200)"`.
fn describe(reason: &Option<String>, code: &Option<i64>, status: Option<&u16>) -> String {
    let mut text = match (reason.as_deref(), code) {
        (Some(reason), _) if !reason.is_empty() => reason.to_string(),
        (_, Some(code)) => format!("appliance error {}", code),
        _ => "no reason given".to_string(),
    };
    if let Some(status) = status {
        text.push_str(&format!(" (HTTP {})", status));
    }
    text
}

/// API error response format
///
/// Returned by the local invocation API when a request cannot be served.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "config_error",
///     "message": "configuration error: server address not configured",
///     "details": { "key": "server.host" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "auth_failed", "config_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::MissingCredentials => 400,
            Error::AuthFailed { .. } => 401,
            Error::SessionExpired { .. } => 401,
            Error::EndpointNotFound => 502,
            Error::ApplianceRejected { .. } => 502,
            Error::Network(_) => 502,
            Error::Io(_) | Error::Serialization(_) | Error::ApiServerError(_) | Error::Other(_) => {
                500
            }
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::MissingCredentials => "missing_credentials",
            Error::EndpointNotFound => "endpoint_not_found",
            Error::AuthFailed { .. } => "auth_failed",
            Error::SessionExpired { .. } => "session_expired",
            Error::ApplianceRejected { .. } => "appliance_rejected",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::AuthFailed {
                code: Some(code), ..
            } => Some(serde_json::json!({ "appliance_error": code })),
            Error::ApplianceRejected { code, status, .. } => Some(serde_json::json!({
                "appliance_error": code,
                "http_status": status,
            })),
            Error::SessionExpired { status, .. } => {
                Some(serde_json::json!({ "appliance_error": 5, "http_status": status }))
            }
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every variant
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::config("server address not configured", "server.host"),
                400,
                "config_error",
            ),
            (Error::MissingCredentials, 400, "missing_credentials"),
            (Error::EndpointNotFound, 502, "endpoint_not_found"),
            (
                Error::AuthFailed {
                    code: Some(1),
                    reason: None,
                },
                401,
                "auth_failed",
            ),
            (
                Error::SessionExpired {
                    reason: Some("session error".into()),
                    status: 200,
                },
                401,
                "session_expired",
            ),
            (
                Error::ApplianceRejected {
                    code: Some(7),
                    reason: None,
                    status: 200,
                },
                502,
                "appliance_rejected",
            ),
            (Error::Network("refused".into()), 502, "network_error"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_and_code() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
            assert_eq!(error.error_code(), code, "code for {:?}", error);
        }
    }

    #[test]
    fn session_expired_message_combines_reason_and_status() {
        let error = Error::SessionExpired {
            reason: Some("session error".into()),
            status: 200,
        };
        assert_eq!(error.to_string(), "session expired: session error (HTTP 200)");
    }

    #[test]
    fn rejection_without_reason_falls_back_to_code() {
        let error = Error::ApplianceRejected {
            code: Some(7),
            reason: None,
            status: 500,
        };
        assert_eq!(
            error.to_string(),
            "appliance rejected the task: appliance error 7 (HTTP 500)"
        );
    }

    #[test]
    fn rejection_with_empty_reason_and_no_code() {
        let error = Error::ApplianceRejected {
            code: None,
            reason: Some(String::new()),
            status: 403,
        };
        assert_eq!(
            error.to_string(),
            "appliance rejected the task: no reason given (HTTP 403)"
        );
    }

    #[test]
    fn api_error_carries_config_key_detail() {
        let api: ApiError = Error::config("bad index", "directories").into();
        assert_eq!(api.error.code, "config_error");
        assert_eq!(api.error.details.unwrap()["key"], "directories");
    }

    #[test]
    fn api_error_for_network_has_no_details() {
        let api: ApiError = Error::Network("connection refused".into()).into();
        assert_eq!(api.error.code, "network_error");
        assert_eq!(api.error.message, "network error: connection refused");
        assert!(api.error.details.is_none());
    }
}
