//! Session broker: download-station login with administration fallback.

use crate::config::ServerConfig;
use crate::resolver::{Decision, EndpointResolver, LoginCandidate};
use crate::response::{parse_body, scrape_auth_sid};
use crate::transport::HttpRequest;
use crate::types::{LoginResult, REASON_SESSION_MISSING, Session};

use super::NasClient;

/// General administration login, tried once after every download-station candidate failed
pub(crate) const AUTH_LOGIN_PATH: &str = "/cgi-bin/authLogin.cgi";

/// Download-station logout
pub(crate) const LOGOUT_PATH: &str = "/downloadstation/V4/Misc/Logout";

/// Most recent reason a login attempt gave up, reported when nothing succeeds
struct Diagnostic {
    code: Option<i64>,
    reason: String,
}

impl Diagnostic {
    fn into_failure(self) -> LoginResult {
        LoginResult::failure(self.code, self.reason)
    }
}

impl NasClient {
    /// Log in with the stored configuration
    ///
    /// Returns the session on success; on failure the result carries the
    /// error code and reason of the last candidate attempted. No state is
    /// kept between calls.
    pub async fn login(&self) -> LoginResult {
        match self.store.read().await {
            Ok(config) => self.login_with(&config.server, None).await,
            Err(e) => LoginResult::failure(None, e.to_string()),
        }
    }

    /// Log in against `server`, trying `hint` before the static candidate table
    pub(crate) async fn login_with(
        &self,
        server: &ServerConfig,
        hint: Option<LoginCandidate>,
    ) -> LoginResult {
        let Some((username, password)) = server.credentials() else {
            tracing::debug!("Login skipped: credentials not configured");
            return LoginResult::failure(None, "missing_credentials");
        };

        let base_url = server.base_url();
        let resolver = EndpointResolver::with_hint(hint);
        let mut last = Diagnostic {
            code: None,
            reason: "endpoint_not_found".to_string(),
        };

        for candidate in resolver.candidates() {
            let mut request = HttpRequest::post(format!("{}{}", base_url, candidate.path));
            request
                .params
                .extend(candidate.credential_params(username, password));

            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!(endpoint = %candidate.path, scheme = ?candidate.scheme, error = %e, "Login candidate unreachable");
                    last = Diagnostic {
                        code: None,
                        reason: e.to_string(),
                    };
                    continue;
                }
            };

            let parsed = if response.status == 404 {
                None
            } else {
                parse_body(&response.body)
            };

            match crate::resolver::decide(response.status, parsed.as_ref()) {
                Decision::Success(session) => {
                    tracing::info!(
                        endpoint = %candidate.path,
                        scheme = ?candidate.scheme,
                        has_token = session.token.is_some(),
                        "Download station login succeeded"
                    );
                    return LoginResult::success(session, Some(candidate));
                }
                Decision::Fail { code, reason } => {
                    tracing::warn!(
                        endpoint = %candidate.path,
                        code,
                        reason = reason.as_deref().unwrap_or(""),
                        "Download station refused the login"
                    );
                    let reason = reason.unwrap_or_else(|| format!("appliance error {}", code));
                    return LoginResult::failure(Some(code), reason);
                }
                Decision::Advance { code, reason } => {
                    tracing::debug!(
                        endpoint = %candidate.path,
                        scheme = ?candidate.scheme,
                        status = response.status,
                        reason = %reason,
                        "Login candidate rejected, trying next"
                    );
                    // A bare 404 tells nothing new once a real answer was seen
                    if response.status != 404 || last.code.is_none() {
                        last = Diagnostic { code, reason };
                    }
                }
            }
        }

        tracing::debug!("Download station candidates exhausted, trying administration login");
        self.admin_login(&base_url, username, password, last).await
    }

    /// Administration-service login: POST first, then the same credentials as a GET query
    async fn admin_login(
        &self,
        base_url: &str,
        username: &str,
        password: &str,
        last: Diagnostic,
    ) -> LoginResult {
        let url = format!("{}{}", base_url, AUTH_LOGIN_PATH);
        let post = HttpRequest::post(url.as_str())
            .param("user", username)
            .param("pwd", password);

        let response = match self.transport.send(post).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "Administration login POST failed, retrying as GET");
                let get = HttpRequest::get(url.as_str())
                    .param("user", username)
                    .param("pwd", password);
                match self.transport.send(get).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::warn!(error = %e, "Administration login unreachable");
                        return LoginResult::failure(None, e.to_string());
                    }
                }
            }
        };

        if let Some(session_id) = scrape_auth_sid(&response.body) {
            tracing::info!("Administration login succeeded");
            return LoginResult::success(Session::new(session_id), None);
        }

        if response.is_success() {
            tracing::warn!(
                status = response.status,
                "Administration login answered without a session id"
            );
            return LoginResult::failure(None, REASON_SESSION_MISSING);
        }

        tracing::warn!(status = response.status, "Administration login failed");
        if response.status == 404 {
            last.into_failure()
        } else {
            LoginResult::failure(
                None,
                format!("administration login rejected (HTTP {})", response.status),
            )
        }
    }

    /// End a download-station session
    ///
    /// Best effort: any failure means the session is treated as already gone.
    pub async fn logout(&self, session: &Session) {
        let server = match self.store.read().await {
            Ok(config) => config.server,
            Err(e) => {
                tracing::debug!(error = %e, "Logout skipped: configuration unavailable");
                return;
            }
        };
        self.logout_from(&server, session).await;
    }

    pub(crate) async fn logout_from(&self, server: &ServerConfig, session: &Session) {
        let request = HttpRequest::post(format!("{}{}", server.base_url(), LOGOUT_PATH))
            .param("sid", session.session_id.as_str());

        match self.transport.send(request).await {
            Ok(response) => {
                tracing::debug!(status = response.status, "Download station logout sent");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Download station logout failed, treating as logged out");
            }
        }
    }
}
