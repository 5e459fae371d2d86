//! Download-station login endpoint discovery
//!
//! Firmware lines expose the download-station login under different paths and
//! with different field names, and some expect the password Base64-encoded.
//! This module is the declarative table of what has been seen in the wild plus
//! a pure decision function over one candidate's response. It never performs
//! I/O; the session broker drives it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::response::ParsedBody;
use crate::types::{SESSION_ERROR_CODE, Session};

/// Login paths, most common firmware first
pub const LOGIN_PATHS: &[&str] = &[
    "/downloadstation/V4/Misc/Login",
    "/downloadstation/V4/Login",
    "/downloadstation/V3/Misc/Login",
    "/downloadstation/V3/Login",
    "/downloadstation/login.cgi",
    "/cgi-bin/downloadstation/login.cgi",
    "/downloadstation/Misc/Login",
    "/downloadstation/Login",
];

/// Parameter schemes tried on every path, in order
pub const PARAM_SCHEMES: [ParamScheme; 4] = [
    ParamScheme::UserPass,
    ParamScheme::UsernamePassword,
    ParamScheme::UserPassword,
    ParamScheme::UsernamePass,
];

/// Field names a login call uses for the credentials
///
/// The `pass` field always carries the Base64-encoded password; `password`
/// carries it plain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamScheme {
    /// `user` + `pass` (Base64)
    UserPass,
    /// `username` + `password` (plain)
    UsernamePassword,
    /// `user` + `password` (plain)
    UserPassword,
    /// `username` + `pass` (Base64)
    UsernamePass,
}

impl ParamScheme {
    /// Name of the user field
    pub fn user_field(self) -> &'static str {
        match self {
            ParamScheme::UserPass | ParamScheme::UserPassword => "user",
            ParamScheme::UsernamePassword | ParamScheme::UsernamePass => "username",
        }
    }

    /// Name of the password field
    pub fn pass_field(self) -> &'static str {
        match self {
            ParamScheme::UserPass | ParamScheme::UsernamePass => "pass",
            ParamScheme::UsernamePassword | ParamScheme::UserPassword => "password",
        }
    }

    /// Whether the password is sent Base64-encoded
    pub fn encodes_password(self) -> bool {
        self.pass_field() == "pass"
    }
}

/// One (path, parameter scheme) pair to try
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct LoginCandidate {
    /// Path relative to the appliance base URL
    pub path: String,
    /// Credential field names
    pub scheme: ParamScheme,
}

impl LoginCandidate {
    /// Build a candidate
    pub fn new(path: impl Into<String>, scheme: ParamScheme) -> Self {
        Self {
            path: path.into(),
            scheme,
        }
    }

    /// Form parameters carrying the credentials in this candidate's shape
    pub fn credential_params(&self, username: &str, password: &str) -> Vec<(String, String)> {
        let password = if self.scheme.encodes_password() {
            BASE64.encode(password)
        } else {
            password.to_string()
        };
        vec![
            (self.scheme.user_field().to_string(), username.to_string()),
            (self.scheme.pass_field().to_string(), password),
        ]
    }
}

/// What to do after one candidate's response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Wrong call shape; try the next candidate. Carries the diagnostic.
    Advance {
        /// Appliance error code, if one was reported
        code: Option<i64>,
        /// Why this candidate was abandoned
        reason: String,
    },
    /// A session was obtained; stop
    Success(Session),
    /// The endpoint is right but refused the session (code 5); stop without fallback
    Fail {
        /// Appliance error code
        code: i64,
        /// Appliance reason
        reason: Option<String>,
    },
}

/// Classify one candidate's response.
///
/// `parsed` is `None` when the body was neither JSON nor markup with a session tag.
pub fn decide(status: u16, parsed: Option<&ParsedBody>) -> Decision {
    if status == 404 {
        return Decision::Advance {
            code: None,
            reason: "endpoint_not_found".to_string(),
        };
    }

    let Some(parsed) = parsed else {
        return Decision::Advance {
            code: None,
            reason: format!("unparseable response (HTTP {})", status),
        };
    };

    match parsed.error {
        Some(SESSION_ERROR_CODE) => Decision::Fail {
            code: SESSION_ERROR_CODE,
            reason: parsed.reason.clone(),
        },
        Some(code) if code != 0 => Decision::Advance {
            code: Some(code),
            reason: parsed
                .reason
                .clone()
                .unwrap_or_else(|| format!("appliance error {}", code)),
        },
        _ => match &parsed.session_id {
            Some(session_id) => Decision::Success(Session {
                session_id: session_id.clone(),
                token: parsed.token.clone(),
            }),
            None => Decision::Advance {
                code: None,
                reason: "login response carried no session id".to_string(),
            },
        },
    }
}

/// Enumerates login candidates in priority order
///
/// Iteration is lazy, finite and restartable: every call to
/// [`candidates`](Self::candidates) yields the same sequence. A hint (the
/// candidate that worked last time within the same user action) goes first and
/// is not repeated later.
#[derive(Clone, Debug, Default)]
pub struct EndpointResolver {
    hint: Option<LoginCandidate>,
}

impl EndpointResolver {
    /// Resolver over the static table only
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that tries `hint` first
    pub fn with_hint(hint: Option<LoginCandidate>) -> Self {
        Self { hint }
    }

    /// Candidates in the order they should be tried
    pub fn candidates(&self) -> impl Iterator<Item = LoginCandidate> + '_ {
        let hint = self.hint.clone();
        self.hint.clone().into_iter().chain(
            LOGIN_PATHS
                .iter()
                .flat_map(|path| {
                    PARAM_SCHEMES
                        .iter()
                        .map(move |scheme| LoginCandidate::new(*path, *scheme))
                })
                .filter(move |candidate| hint.as_ref() != Some(candidate)),
        )
    }

    /// Total number of candidates [`candidates`](Self::candidates) yields
    pub fn len(&self) -> usize {
        self.candidates().count()
    }

    /// Never true; the static table is non-empty
    pub fn is_empty(&self) -> bool {
        false
    }
}
