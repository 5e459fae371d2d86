//! Core types for nas-magnet

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, ToHttpStatus};
use crate::resolver::LoginCandidate;

/// Error code the download station uses for "session invalid or expired"
///
/// It may also mean wrong credentials on a correct endpoint. It is the only
/// code that triggers a fresh login, and never a reason to try another path.
pub const SESSION_ERROR_CODE: i64 = 5;

/// Reason reported when the administration login answered without a session id
pub const REASON_SESSION_MISSING: &str = "session_missing";

/// An authenticated download-station session
///
/// Ephemeral: produced per user action and dropped when the action finishes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    /// Session identifier sent as `sid` on every download-station call
    pub session_id: String,

    /// Secondary credential some firmware versions return alongside the sid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Session {
    /// Session with only a session id
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            token: None,
        }
    }
}

/// Outcome of a login attempt
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResult {
    /// Whether a session was obtained
    pub ok: bool,

    /// The session (always present when `ok` is true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,

    /// Appliance error code from the last attempted candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,

    /// Reason from the last attempted candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Download-station candidate that produced the session, reusable as a hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<LoginCandidate>,
}

impl LoginResult {
    pub(crate) fn success(session: Session, endpoint: Option<LoginCandidate>) -> Self {
        Self {
            ok: true,
            session: Some(session),
            error_code: None,
            reason: None,
            endpoint,
        }
    }

    pub(crate) fn failure(error_code: Option<i64>, reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            session: None,
            error_code,
            reason: Some(reason.into()),
            endpoint: None,
        }
    }

    /// The appliance answered the administration login but handed out no session id
    #[must_use]
    pub fn is_session_missing(&self) -> bool {
        !self.ok && self.reason.as_deref() == Some(REASON_SESSION_MISSING)
    }

    /// The session, or the taxonomy error describing why there is none
    pub fn into_result(self) -> crate::error::Result<Session> {
        if let Some(session) = self.session {
            return Ok(session);
        }
        Err(match self.reason.as_deref() {
            Some("missing_credentials") => Error::MissingCredentials,
            Some("endpoint_not_found") if self.error_code.is_none() => Error::EndpointNotFound,
            _ => Error::AuthFailed {
                code: self.error_code,
                reason: self.reason,
            },
        })
    }
}

/// One magnet link bound for one directory
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionRequest {
    /// The magnet URI, passed through unchanged
    pub magnet_uri: String,

    /// Target directory on the appliance
    pub target_directory: crate::config::DirectoryConfig,
}

/// Outcome of a submission
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResult {
    /// Whether the appliance accepted the task
    pub ok: bool,

    /// Human-readable failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Machine-readable failure code (e.g., "auth_failed", "session_expired")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl SubmissionResult {
    /// Successful submission
    pub fn success() -> Self {
        Self {
            ok: true,
            reason: None,
            code: None,
        }
    }
}

impl From<Error> for SubmissionResult {
    fn from(error: Error) -> Self {
        Self {
            ok: false,
            code: Some(error.error_code().to_string()),
            reason: Some(error.to_string()),
        }
    }
}

/// Result of probing one download-station endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EndpointProbe {
    /// HTTP status code (absent on transport failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Canonical reason phrase for the status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    /// Whether the status was a success
    pub ok: bool,

    /// First part of the body for successful responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Transport error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What to do with a magnet link handed over without a target directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MagnetDisposition {
    /// Sent to the appliance
    Submitted {
        /// Name of the directory the task went to
        directory: String,
    },
    /// The caller should copy the link to the clipboard
    CopyToClipboard {
        /// The magnet URI to copy
        magnet_uri: String,
        /// Why the link was not submitted
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

/// Event emitted by the client
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task was accepted by the appliance
    TaskSubmitted {
        /// Directory name
        directory: String,
        /// Magnet URI
        magnet_uri: String,
        /// When the appliance accepted it
        #[schema(value_type = String)]
        timestamp: DateTime<Utc>,
    },

    /// A submission ended in failure
    SubmissionFailed {
        /// Directory name (absent when the index was invalid)
        #[serde(skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
        /// Machine-readable error code
        code: String,
        /// Human-readable reason
        reason: String,
    },

    /// The visible task counter changed (0 means cleared)
    BadgeChanged {
        /// Current counter value
        count: u64,
    },

    /// The stored configuration changed
    ConfigChanged {
        /// Whether the directory list changed (menus need rebuilding)
        directories_changed: bool,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_result_from_error_carries_code_and_message() {
        let result: SubmissionResult = Error::SessionExpired {
            reason: Some("session error".into()),
            status: 200,
        }
        .into();

        assert!(!result.ok);
        assert_eq!(result.code.as_deref(), Some("session_expired"));
        assert_eq!(
            result.reason.as_deref(),
            Some("session expired: session error (HTTP 200)")
        );
    }

    #[test]
    fn successful_submission_serializes_without_optional_fields() {
        let json = serde_json::to_value(SubmissionResult::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));
    }

    #[test]
    fn login_failure_maps_to_taxonomy() {
        assert!(matches!(
            LoginResult::failure(None, "missing_credentials").into_result(),
            Err(Error::MissingCredentials)
        ));
        assert!(matches!(
            LoginResult::failure(None, "endpoint_not_found").into_result(),
            Err(Error::EndpointNotFound)
        ));
        assert!(matches!(
            LoginResult::failure(Some(5), "session error").into_result(),
            Err(Error::AuthFailed { code: Some(5), .. })
        ));
        let session = LoginResult::success(Session::new("abc"), None).into_result();
        assert_eq!(session.unwrap().session_id, "abc");
    }

    #[test]
    fn session_missing_is_recognized() {
        assert!(LoginResult::failure(None, REASON_SESSION_MISSING).is_session_missing());
        assert!(!LoginResult::failure(Some(5), "session error").is_session_missing());
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(Event::BadgeChanged { count: 3 }).unwrap();
        assert_eq!(json["type"], "badge_changed");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn magnet_disposition_serializes_with_action_tag() {
        let json = serde_json::to_value(MagnetDisposition::CopyToClipboard {
            magnet_uri: "magnet:?xt=urn:btih:ABCDEF".into(),
            reason: None,
        })
        .unwrap();
        assert_eq!(json["action"], "copy_to_clipboard");
        assert!(json.get("reason").is_none());
    }
}
