// src/session/mod.rs
// Session controller: one connection, at most one in-flight job

use crate::api::{percent, ApiClient, ByteProgress, TranscriptionResult};
use crate::error::ClientError;
use crate::job::progress::{ProgressCallback, ProgressUpdate};
use crate::job::{poller, use_async_path, CancelHandle, JobHandle};
use crate::mode::{resolve_mode, ModeAdvisory, TranscriptionMode};
use crate::probe::probe_duration_secs;
use crate::validate::{validate_language_tag, validate_payload, AudioPayload};
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Everything needed to submit one transcription. Immutable once handed to
/// [`Session::transcribe`].
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    pub payload: AudioPayload,
    pub language: String,
    pub mode: TranscriptionMode,
    /// Caller explicitly pinned the mode; the duration guard blocks instead
    /// of auto-switching.
    pub force_mode: bool,
    pub force_async: bool,
}

/// Outcome of a successful connect.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub base_url: String,
    pub service: Option<String>,
    pub version: Option<String>,
    pub languages: Vec<String>,
    /// Set when the best-effort language fetch failed; the connection is
    /// still valid.
    pub languages_warning: Option<String>,
}

/// Terminal result of one transcription, with the advisory (if the mode was
/// auto-switched) and the async job id (if the async path was taken).
#[derive(Debug, Clone)]
pub struct TranscriptionOutcome {
    pub result: TranscriptionResult,
    pub advisory: Option<ModeAdvisory>,
    pub job_id: Option<String>,
}

struct ActiveJob {
    job_id: String,
    cancel: CancelHandle,
}

#[derive(Default)]
struct SessionState {
    status: ConnectionStatus,
    client: Option<Arc<ApiClient>>,
    languages: Vec<String>,
    active: Option<ActiveJob>,
}

/// Owns the connection and the single-active-job invariant. All mutation
/// goes through its methods; the lock is never held across an await.
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().expect("session lock poisoned").status
    }

    pub fn languages(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("session lock poisoned")
            .languages
            .clone()
    }

    pub fn active_job_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("session lock poisoned")
            .active
            .as_ref()
            .map(|job| job.job_id.clone())
    }

    /// Connect to a service: probe liveness with a short timeout, then fetch
    /// the supported-language list best-effort. A language-fetch failure
    /// keeps the connection valid but is surfaced as a warning.
    pub async fn connect(
        &self,
        address: &str,
        credential: Option<String>,
    ) -> Result<ConnectionInfo, ClientError> {
        let client = Arc::new(ApiClient::new(address, credential)?);

        {
            let mut state = self.state.lock().expect("session lock poisoned");
            if let Some(active) = state.active.take() {
                active.cancel.cancel();
            }
            state.status = ConnectionStatus::Connecting;
            state.client = None;
            state.languages.clear();
        }

        let health = match client.health().await {
            Ok(h) => h,
            Err(e) => {
                self.state.lock().expect("session lock poisoned").status =
                    ConnectionStatus::Disconnected;
                return Err(e);
            }
        };

        tracing::info!(
            "Connected to {} ({} {})",
            client.base_url(),
            health.service.as_deref().unwrap_or("unknown service"),
            health.version.as_deref().unwrap_or("?")
        );

        let (languages, languages_warning) = match client.languages(None, 2000, 0).await {
            Ok(list) => {
                tracing::info!("Fetched {} supported languages", list.count);
                (list.languages, None)
            }
            Err(e) => {
                tracing::warn!("Language list unavailable: {}", e);
                (
                    Vec::new(),
                    Some(format!("Could not fetch supported languages: {}", e)),
                )
            }
        };

        let info = ConnectionInfo {
            base_url: client.base_url().to_string(),
            service: health.service,
            version: health.version,
            languages: languages.clone(),
            languages_warning,
        };

        {
            let mut state = self.state.lock().expect("session lock poisoned");
            state.status = ConnectionStatus::Connected;
            state.client = Some(client);
            state.languages = languages;
        }

        Ok(info)
    }

    /// Tear down the connection. Cancels any in-flight poll loop and drops
    /// the credential. No server-side call; the server is stateless.
    pub fn disconnect(&self) {
        let mut state = self.state.lock().expect("session lock poisoned");
        if let Some(active) = state.active.take() {
            active.cancel.cancel();
        }
        state.client = None;
        state.languages.clear();
        state.status = ConnectionStatus::Disconnected;
        tracing::info!("Disconnected");
    }

    /// Cancel the in-flight job, if any. Returns whether one was cancelled.
    /// Cancelling twice, or after the job completed naturally, is a no-op.
    pub fn cancel_active(&self) -> bool {
        let mut state = self.state.lock().expect("session lock poisoned");
        match state.active.take() {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Validate, guard, and submit one transcription, driving it to a
    /// terminal result. Submitting while a job is in flight first cancels
    /// the previous poll loop.
    pub async fn transcribe(
        &self,
        request: TranscribeRequest,
        on_progress: ProgressCallback,
    ) -> Result<TranscriptionOutcome, ClientError> {
        let client = {
            let mut state = self.state.lock().expect("session lock poisoned");
            if let Some(previous) = state.active.take() {
                tracing::warn!(
                    "Cancelling in-flight job {} before submitting a new one",
                    previous.job_id
                );
                previous.cancel.cancel();
            }
            state
                .client
                .clone()
                .ok_or_else(|| ClientError::Connection("Not connected".to_string()))?
        };

        validate_payload(&request.payload)?;
        validate_language_tag(&request.language)?;

        let duration = probe_duration_secs(&request.payload);
        let decision = resolve_mode(request.mode, request.force_mode, duration)?;
        if let Some(advisory) = &decision.advisory {
            on_progress(ProgressUpdate::ModeSwitched {
                advisory: advisory.clone(),
            });
        }

        let upload_progress = on_progress.clone();
        let on_upload: ByteProgress = Arc::new(move |sent, total| {
            upload_progress(ProgressUpdate::Uploading {
                progress_percent: percent(sent, total),
            });
        });
        on_progress(ProgressUpdate::Uploading {
            progress_percent: 0,
        });

        if use_async_path(decision.mode, request.payload.size(), request.force_async) {
            let submission = client
                .transcribe_async(&request.payload, &request.language, on_upload)
                .await?;

            let handle = JobHandle::new(submission.job_id.clone());
            let cancel = CancelHandle::new();
            {
                let mut state = self.state.lock().expect("session lock poisoned");
                state.active = Some(ActiveJob {
                    job_id: handle.job_id.clone(),
                    cancel: cancel.clone(),
                });
            }

            on_progress(ProgressUpdate::Submitted {
                job_id: handle.job_id.clone(),
                estimated_secs: submission.estimated_time,
            });

            let outcome =
                poller::poll_job(client.as_ref(), &handle, &cancel, on_progress.as_ref()).await;

            {
                let mut state = self.state.lock().expect("session lock poisoned");
                if state
                    .active
                    .as_ref()
                    .map(|job| job.job_id == handle.job_id)
                    .unwrap_or(false)
                {
                    state.active = None;
                }
            }

            Ok(TranscriptionOutcome {
                result: outcome?,
                advisory: decision.advisory,
                job_id: Some(handle.job_id),
            })
        } else {
            let result = client
                .transcribe_sync(&request.payload, &request.language, decision.mode, on_upload)
                .await?;

            Ok(TranscriptionOutcome {
                result,
                advisory: decision.advisory,
                job_id: None,
            })
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
