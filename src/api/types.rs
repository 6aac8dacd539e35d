// src/api/types.rs
// Wire models for the OmniASR HTTP API

use serde::{Deserialize, Serialize};

/// Response from `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Response from `GET /languages`.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageList {
    pub total: u32,
    pub count: u32,
    pub languages: Vec<String>,
}

/// One timed span of transcribed speech.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// Terminal artifact of a transcription job. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcription text
    pub transcription: String,
    /// Language code used for transcription
    pub language: String,
    /// Processing time in seconds
    pub processing_time: f64,
    /// Audio duration in seconds
    pub audio_duration: f64,
    #[serde(default)]
    pub segments_count: Option<u32>,
    #[serde(default)]
    pub segments: Option<Vec<Segment>>,
    pub request_id: String,
}

impl TranscriptionResult {
    pub fn segments(&self) -> &[Segment] {
        self.segments.as_deref().unwrap_or(&[])
    }

    /// Real-time factor: processing time divided by audio duration.
    pub fn rtf(&self) -> f64 {
        if self.audio_duration > 0.0 {
            self.processing_time / self.audio_duration
        } else {
            0.0
        }
    }
}

/// Response from `POST /transcribe_async`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmitResponse {
    pub job_id: String,
    /// Rough server-side estimate in seconds
    #[serde(default)]
    pub estimated_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One status snapshot from `GET /jobs/{id}`. Superseded by the next poll.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobState,
    /// 0-100
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<TranscriptionResult>,
}

/// Error body shared by every endpoint: `{error, message, request_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_round_trip_fields() {
        let json = r#"{
            "transcription": "hello world",
            "language": "eng_Latn",
            "processing_time": 1.234,
            "audio_duration": 5.0,
            "segments_count": 1,
            "segments": [{"start": 0.0, "end": 5.0, "text": "hello world"}],
            "request_id": "abc-123"
        }"#;

        let result: TranscriptionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.transcription, "hello world");
        assert_eq!(result.segments().len(), 1);
        assert!((result.rtf() - 0.2468).abs() < 1e-9);
    }

    #[test]
    fn test_result_without_segments() {
        let json = r#"{
            "transcription": "t",
            "language": "eng_Latn",
            "processing_time": 0.5,
            "audio_duration": 0.0,
            "request_id": "r"
        }"#;

        let result: TranscriptionResult = serde_json::from_str(json).unwrap();
        assert!(result.segments().is_empty());
        assert_eq!(result.rtf(), 0.0);
    }

    #[test]
    fn test_job_status_states() {
        let snapshot: JobStatusResponse = serde_json::from_str(
            r#"{"status": "processing", "progress": 42.0, "message": "chunk 3/7"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.status, JobState::Processing);
        assert_eq!(snapshot.progress, Some(42.0));
        assert!(snapshot.result.is_none());
    }

    #[test]
    fn test_health_body() {
        let health: HealthResponse = serde_json::from_str(
            r#"{"status": "healthy", "service": "OmniASR", "timestamp": 1.0, "version": "2.3.0"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
    }
}
