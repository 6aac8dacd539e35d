// src/job/progress.rs
// Progress events surfaced to the caller during a transcription

use crate::api::JobState;
use crate::mode::ModeAdvisory;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ProgressUpdate {
    /// Fired while the payload streams to the server.
    Uploading { progress_percent: u8 },
    /// The duration guard switched the mode automatically.
    ModeSwitched { advisory: ModeAdvisory },
    /// Async submission accepted; polling is about to start.
    Submitted {
        job_id: String,
        estimated_secs: Option<f64>,
    },
    /// One poll snapshot for a job still in flight.
    Polling {
        state: JobState,
        progress_percent: u8,
        message: Option<String>,
    },
}

pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Callback that drops every update, for callers that do not care.
pub fn sink() -> ProgressCallback {
    Arc::new(|_| {})
}
