// src/job/poller.rs
// Timer-driven poll loop for async transcription jobs

use crate::api::{percent, JobState, JobStatusResponse, TranscriptionResult};
use crate::error::ClientError;
use crate::job::progress::ProgressUpdate;
use crate::job::JobHandle;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const POLL_CEILING: Duration = Duration::from_secs(30 * 60);

/// Seam between the poll loop and the HTTP client, mockable in tests.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError>;
}

#[async_trait]
impl JobStatusSource for crate::api::ApiClient {
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        crate::api::ApiClient::job_status(self, job_id).await
    }
}

/// Cancellation handle for one poll loop.
///
/// Purely local bookkeeping: cancelling stops the interval timer and discards
/// the job handle client-side, it never notifies the server, so the
/// server-side job may run to completion unobserved. Cancelling twice or
/// cancelling after natural completion is a no-op.
#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            tracing::info!("Poll loop cancellation requested");
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancel() has been called.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Drive an async job to a terminal state.
///
/// One immediate status query, then one query per 3s tick, each issued only
/// after the previous response resolved. Transient errors keep the loop
/// alive; only a definitive job-not-found ends it early with an error. The
/// loop self-terminates with a timeout once 30 minutes elapse since
/// submission without a terminal status. Cancellation stops future ticks; a
/// query already in flight runs to completion and its response is discarded.
pub async fn poll_job<S>(
    source: &S,
    handle: &JobHandle,
    cancel: &CancelHandle,
    on_progress: &(dyn Fn(ProgressUpdate) + Send + Sync),
) -> Result<TranscriptionResult, ClientError>
where
    S: JobStatusSource + ?Sized,
{
    tracing::info!("Polling job {} every {:?}", handle.job_id, POLL_INTERVAL);

    loop {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let snapshot = source.job_status(&handle.job_id).await;

        // Cancellation during the in-flight query: discard the response.
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        match snapshot {
            Ok(status) => match status.status {
                JobState::Completed => {
                    tracing::info!("Job {} completed", handle.job_id);
                    return status.result.ok_or_else(|| {
                        ClientError::JobFailed(
                            "Job reported completed but carried no result".to_string(),
                        )
                    });
                }
                JobState::Failed => {
                    let message = status
                        .message
                        .unwrap_or_else(|| "Job failed without a message".to_string());
                    tracing::warn!("Job {} failed: {}", handle.job_id, message);
                    return Err(ClientError::JobFailed(message));
                }
                JobState::Pending | JobState::Processing => {
                    let progress_percent = status
                        .progress
                        .map(|p| percent(p.max(0.0) as u64, 100))
                        .unwrap_or(0);
                    on_progress(ProgressUpdate::Polling {
                        state: status.status,
                        progress_percent,
                        message: status.message,
                    });
                }
            },
            Err(ClientError::JobNotFound(id)) => {
                tracing::warn!("Job {} no longer known to the server", id);
                return Err(ClientError::JobNotFound(id));
            }
            Err(e) => {
                // Everything short of a definitive lookup failure is retried
                // on the next tick, up to the timeout ceiling.
                if e.is_transient() {
                    tracing::warn!("Transient poll error for job {}: {}", handle.job_id, e);
                } else {
                    tracing::error!(
                        "Unexpected poll error for job {}: {} (retrying)",
                        handle.job_id,
                        e
                    );
                }
            }
        }

        let elapsed = handle.submitted_at.elapsed();
        if elapsed >= POLL_CEILING {
            tracing::warn!(
                "Job {} exceeded the {}s polling ceiling",
                handle.job_id,
                POLL_CEILING.as_secs()
            );
            return Err(ClientError::JobTimedOut(elapsed.as_secs()));
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }
}
