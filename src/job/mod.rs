// src/job/mod.rs
// Job submission: sync/async path selection and the async job handle

pub mod poller;
pub mod progress;

pub use poller::{CancelHandle, JobStatusSource, POLL_CEILING, POLL_INTERVAL};
pub use progress::{ProgressCallback, ProgressUpdate};

use crate::mode::TranscriptionMode;
use tokio::time::Instant;

/// Payloads above this size use the async path when extended mode is active.
pub const ASYNC_SIZE_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Decision rule for the transmission path: async when explicitly forced, or
/// when extended mode is combined with a payload large enough that a single
/// long-held connection is a liability.
pub fn use_async_path(mode: TranscriptionMode, payload_size: u64, force_async: bool) -> bool {
    force_async || (mode == TranscriptionMode::Extended && payload_size > ASYNC_SIZE_THRESHOLD)
}

/// Server-issued handle for an async job. Exists from the submission response
/// until the poll loop reaches a terminal state; owned exclusively by that
/// loop.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub job_id: String,
    pub submitted_at: Instant,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_path_decision() {
        let small = 1024;
        let large = ASYNC_SIZE_THRESHOLD + 1;

        // Forced async wins regardless of mode and size
        assert!(use_async_path(TranscriptionMode::Standard, small, true));
        assert!(use_async_path(TranscriptionMode::Extended, small, true));

        // Extended + large payload goes async
        assert!(use_async_path(TranscriptionMode::Extended, large, false));

        // Everything else stays synchronous
        assert!(!use_async_path(TranscriptionMode::Extended, small, false));
        assert!(!use_async_path(
            TranscriptionMode::Extended,
            ASYNC_SIZE_THRESHOLD,
            false
        ));
        assert!(!use_async_path(TranscriptionMode::Standard, large, false));
    }
}
