// src/lib.rs
// Async client library for the OmniASR hosted transcription service

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod job;
pub mod mode;
pub mod probe;
pub mod session;
pub mod validate;

pub use api::{ApiClient, HealthResponse, JobState, LanguageList, Segment, TranscriptionResult};
pub use config::ClientConfig;
pub use error::ClientError;
pub use export::ExportFormat;
pub use job::poller::CancelHandle;
pub use job::progress::{ProgressCallback, ProgressUpdate};
pub use job::JobHandle;
pub use mode::{ModeAdvisory, TranscriptionMode};
pub use session::{Session, TranscribeRequest, TranscriptionOutcome};
pub use validate::AudioPayload;
