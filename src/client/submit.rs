//! Task submission pipeline.
//!
//! One submission walks a small state machine:
//!
//! ```text
//! NeedSession ──login──▶ Submit ──error 5──▶ Reauth ──login──▶ Submit ──▶ Done
//!                          │                   │                 │
//!                          └──────▶ Done ◀─────┴─────────────────┘
//! ```
//!
//! Session expiry is recovered exactly once; every other failure ends the call.

use crate::config::{Config, DirectoryConfig, ServerConfig};
use crate::error::{Error, Result};
use crate::resolver::LoginCandidate;
use crate::response::parse_json;
use crate::transport::{HttpRequest, HttpResponse};
use crate::types::{
    Event, LoginResult, SESSION_ERROR_CODE, Session, SubmissionRequest, SubmissionResult,
};

use super::NasClient;

/// Add-task endpoint
pub(crate) const ADD_URL_PATH: &str = "/downloadstation/V4/Task/AddUrl";

/// Staging folder passed as `temp` on every add-task call
pub(crate) const STAGING_FOLDER: &str = "Download";

/// Pipeline position
#[derive(Debug)]
enum SubmitState {
    /// Obtain a session before the first add-task call
    NeedSession,
    /// Send the add-task call
    Submit {
        session: Option<Session>,
        retried: bool,
    },
    /// The add-task call reported session expiry; log in again once
    Reauth { reason: Option<String>, status: u16 },
    /// Finished
    Done(Result<()>),
}

/// How the appliance answered an add-task call
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AddTaskOutcome {
    Accepted,
    SessionExpired {
        reason: Option<String>,
        status: u16,
    },
    Rejected {
        code: Option<i64>,
        reason: Option<String>,
        status: u16,
    },
}

/// Classify an add-task response.
///
/// An explicit JSON `error` decides on its own; otherwise the HTTP status does.
pub(crate) fn classify_add_task(response: &HttpResponse) -> AddTaskOutcome {
    let parsed = parse_json(&response.body);
    let status = response.status;

    match parsed.as_ref().and_then(|p| p.error) {
        Some(0) => AddTaskOutcome::Accepted,
        Some(SESSION_ERROR_CODE) => AddTaskOutcome::SessionExpired {
            reason: parsed.and_then(|p| p.reason),
            status,
        },
        Some(code) => AddTaskOutcome::Rejected {
            code: Some(code),
            reason: parsed.and_then(|p| p.reason),
            status,
        },
        None if response.is_success() => AddTaskOutcome::Accepted,
        None => AddTaskOutcome::Rejected {
            code: None,
            reason: parsed.and_then(|p| p.reason).or_else(|| {
                response.status_text().map(str::to_string)
            }),
            status,
        },
    }
}

/// Check the configuration and pick the target directory before any network call
pub(crate) fn validate(config: &Config, directory_index: usize) -> Result<&DirectoryConfig> {
    if config.server.host.trim().is_empty() {
        return Err(Error::config("server address not configured", "server.host"));
    }

    match config.directories.get(directory_index) {
        Some(directory) if directory.is_usable() => Ok(directory),
        Some(_) => Err(Error::config(
            format!("directory {} has an empty name or path", directory_index),
            "directories",
        )),
        None => Err(Error::config(
            format!(
                "directory index {} out of range ({} configured)",
                directory_index,
                config.directories.len()
            ),
            "directories",
        )),
    }
}

impl NasClient {
    /// Submit a magnet link to the configured directory at `directory_index`
    ///
    /// Never panics and never returns an error: every failure, configuration
    /// problems included, becomes `ok = false` with a machine-readable `code`
    /// and a human-readable `reason`. On success the task badge is bumped and
    /// [`Event::TaskSubmitted`] is emitted; on failure
    /// [`Event::SubmissionFailed`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nas_magnet::{MemoryConfigStore, NasClient};
    /// # use std::sync::Arc;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = NasClient::from_store(Arc::new(MemoryConfigStore::default())).await?;
    /// let result = client.submit("magnet:?xt=urn:btih:ABCDEF", 1).await;
    /// if !result.ok {
    ///     eprintln!("{}: {}", result.code.unwrap_or_default(), result.reason.unwrap_or_default());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit(&self, magnet_uri: &str, directory_index: usize) -> SubmissionResult {
        let config = match self.store.read().await {
            Ok(config) => config,
            Err(e) => return self.report(None, magnet_uri, Err(e), &Default::default()).await,
        };

        self.submit_indexed(&config, magnet_uri, directory_index)
            .await
            .0
    }

    /// Submit to a configured directory of `config`, returning the directory used
    pub(crate) async fn submit_indexed(
        &self,
        config: &Config,
        magnet_uri: &str,
        directory_index: usize,
    ) -> (SubmissionResult, Option<DirectoryConfig>) {
        let directory = match validate(config, directory_index) {
            Ok(directory) => directory.clone(),
            Err(e) => {
                tracing::warn!(directory_index, error = %e, "Submission rejected before sending");
                return (self.report(None, magnet_uri, Err(e), config).await, None);
            }
        };

        let request = SubmissionRequest {
            magnet_uri: magnet_uri.to_string(),
            target_directory: directory.clone(),
        };
        (self.submit_request(config, request).await, Some(directory))
    }

    /// Submit to an explicit directory using the given configuration snapshot
    pub async fn submit_request(
        &self,
        config: &Config,
        request: SubmissionRequest,
    ) -> SubmissionResult {
        let directory = request.target_directory.clone();

        let outcome = if config.server.host.trim().is_empty() {
            Err(Error::config("server address not configured", "server.host"))
        } else if !directory.is_usable() {
            Err(Error::config(
                "directory has an empty name or path",
                "directories",
            ))
        } else {
            self.run_pipeline(&config.server, &request).await
        };

        self.report(Some(&directory), &request.magnet_uri, outcome, config)
            .await
    }

    /// Drive the state machine for one submission
    async fn run_pipeline(&self, server: &ServerConfig, request: &SubmissionRequest) -> Result<()> {
        let has_credentials = server.credentials().is_some();
        let mut hint: Option<LoginCandidate> = None;
        let mut state = SubmitState::NeedSession;

        loop {
            state = match state {
                SubmitState::NeedSession => {
                    if has_credentials {
                        let login = self.login_with(server, None).await;
                        hint = login.endpoint.clone();
                        match session_from(login) {
                            Ok(session) => SubmitState::Submit {
                                session,
                                retried: false,
                            },
                            Err(e) => SubmitState::Done(Err(e)),
                        }
                    } else {
                        tracing::warn!("No credentials configured, submitting without a session");
                        SubmitState::Submit {
                            session: None,
                            retried: false,
                        }
                    }
                }

                SubmitState::Submit { session, retried } => {
                    match self.add_task(server, request, session.as_ref()).await {
                        Ok(AddTaskOutcome::Accepted) => SubmitState::Done(Ok(())),
                        Ok(AddTaskOutcome::SessionExpired { reason, status }) if !retried => {
                            tracing::info!(status, "Session expired during submission, logging in again");
                            SubmitState::Reauth { reason, status }
                        }
                        Ok(AddTaskOutcome::SessionExpired { reason, status }) => {
                            SubmitState::Done(Err(Error::SessionExpired { reason, status }))
                        }
                        Ok(AddTaskOutcome::Rejected {
                            code,
                            reason,
                            status,
                        }) => SubmitState::Done(Err(Error::ApplianceRejected {
                            code,
                            reason,
                            status,
                        })),
                        Err(e) => SubmitState::Done(Err(e)),
                    }
                }

                SubmitState::Reauth { reason, status } => {
                    if !has_credentials {
                        SubmitState::Done(Err(Error::SessionExpired { reason, status }))
                    } else {
                        let login = self.login_with(server, hint.take()).await;
                        match session_from(login) {
                            Ok(session) => SubmitState::Submit {
                                session,
                                retried: true,
                            },
                            Err(e) => SubmitState::Done(Err(e)),
                        }
                    }
                }

                SubmitState::Done(outcome) => return outcome,
            };
        }
    }

    /// One add-task call
    async fn add_task(
        &self,
        server: &ServerConfig,
        request: &SubmissionRequest,
        session: Option<&Session>,
    ) -> Result<AddTaskOutcome> {
        let base_url = server.base_url();
        let mut call = HttpRequest::post(format!("{}{}", base_url, ADD_URL_PATH))
            .param("temp", STAGING_FOLDER)
            .param("move", request.target_directory.path.as_str())
            .param("url", request.magnet_uri.as_str())
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Origin", base_url.as_str())
            .header("Pragma", "no-cache")
            .header("Cache-Control", "no-cache");

        if let Some(session) = session {
            call = call.param("sid", session.session_id.as_str());
            if let Some(token) = &session.token {
                call = call.param("token", token.as_str());
            }
        }

        tracing::debug!(
            directory = %request.target_directory.name,
            has_session = session.is_some(),
            "Sending add-task request"
        );

        let response = self.transport.send(call).await?;
        let outcome = classify_add_task(&response);
        tracing::debug!(status = response.status, outcome = ?outcome, "Add-task response");
        Ok(outcome)
    }

    /// Turn a pipeline outcome into the public result and its side effects
    async fn report(
        &self,
        directory: Option<&DirectoryConfig>,
        magnet_uri: &str,
        outcome: Result<()>,
        config: &Config,
    ) -> SubmissionResult {
        match outcome {
            Ok(()) => {
                let name = directory.map(|d| d.name.clone()).unwrap_or_default();
                tracing::info!(directory = %name, "Task submitted to download station");

                self.emit_event(Event::TaskSubmitted {
                    directory: name,
                    magnet_uri: magnet_uri.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                self.badge.increment(config.badge.reset_after).await;
                SubmissionResult::success()
            }
            Err(e) => {
                let result = SubmissionResult::from(e);
                tracing::warn!(
                    directory = directory.map(|d| d.name.as_str()).unwrap_or(""),
                    code = result.code.as_deref().unwrap_or(""),
                    reason = result.reason.as_deref().unwrap_or(""),
                    "Submission failed"
                );

                self.emit_event(Event::SubmissionFailed {
                    directory: directory.map(|d| d.name.clone()),
                    code: result.code.clone().unwrap_or_default(),
                    reason: result.reason.clone().unwrap_or_default(),
                });
                result
            }
        }
    }
}

/// Session to submit with, `None` when the appliance handed out none but accepted the login
fn session_from(login: LoginResult) -> Result<Option<Session>> {
    if login.is_session_missing() {
        tracing::warn!("Login succeeded without a session id, submitting without one");
        return Ok(None);
    }
    match login.session {
        Some(session) => Ok(Some(session)),
        None => Err(Error::AuthFailed {
            code: login.error_code,
            reason: login.reason,
        }),
    }
}
