// src/mode.rs
// Transcription mode selection and the short-form duration guard

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Seconds of audio above which short-form mode is no longer appropriate.
pub const STANDARD_MODE_MAX_SECS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    /// Single-pass transcription for short clips (`/transcribe`).
    Standard,
    /// Server-side VAD chunking for long audio (`/transcribe_large`).
    Extended,
}

impl TranscriptionMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            TranscriptionMode::Standard => "transcribe",
            TranscriptionMode::Extended => "transcribe_large",
        }
    }
}

/// Non-fatal advisory produced when the guard auto-corrects the mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeAdvisory {
    pub duration_secs: f64,
    pub message: String,
}

/// Outcome of the duration guard for one file-selection event.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeDecision {
    pub mode: TranscriptionMode,
    pub advisory: Option<ModeAdvisory>,
}

/// Apply the duration guard. Pure function; the caller runs it exactly once
/// per file-selection event so the auto-switch cannot repeat.
///
/// - duration unknown: the selected mode stands, the server re-checks.
/// - duration > 40s with standard mode selected: auto-switch to extended and
///   attach an advisory, unless the caller forced standard mode, in which
///   case submission is blocked with an actionable error.
pub fn resolve_mode(
    selected: TranscriptionMode,
    force_selected: bool,
    duration_secs: Option<f64>,
) -> Result<ModeDecision, ClientError> {
    let duration = match duration_secs {
        Some(d) => d,
        None => {
            return Ok(ModeDecision {
                mode: selected,
                advisory: None,
            })
        }
    };

    if selected == TranscriptionMode::Standard && duration > STANDARD_MODE_MAX_SECS {
        if force_selected {
            return Err(ClientError::Validation(format!(
                "Audio is {:.1}s long but standard mode only handles up to {:.0}s. \
                 Switch to extended mode to submit this file",
                duration, STANDARD_MODE_MAX_SECS
            )));
        }

        tracing::info!(
            "Audio is {:.1}s, switching to extended mode automatically",
            duration
        );

        return Ok(ModeDecision {
            mode: TranscriptionMode::Extended,
            advisory: Some(ModeAdvisory {
                duration_secs: duration,
                message: format!(
                    "Audio exceeds {:.0}s; extended mode selected automatically",
                    STANDARD_MODE_MAX_SECS
                ),
            }),
        });
    }

    Ok(ModeDecision {
        mode: selected,
        advisory: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_audio_keeps_standard_mode() {
        let decision = resolve_mode(TranscriptionMode::Standard, false, Some(12.0)).unwrap();
        assert_eq!(decision.mode, TranscriptionMode::Standard);
        assert!(decision.advisory.is_none());
    }

    #[test]
    fn test_long_audio_auto_switches() {
        let decision = resolve_mode(TranscriptionMode::Standard, false, Some(95.5)).unwrap();
        assert_eq!(decision.mode, TranscriptionMode::Extended);
        let advisory = decision.advisory.expect("advisory expected");
        assert_eq!(advisory.duration_secs, 95.5);
    }

    #[test]
    fn test_forced_standard_mode_blocks_long_audio() {
        let err = resolve_mode(TranscriptionMode::Standard, true, Some(41.0)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(err.to_string().contains("extended"));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        // Exactly 40s is still fine for standard mode
        let decision = resolve_mode(TranscriptionMode::Standard, true, Some(40.0)).unwrap();
        assert_eq!(decision.mode, TranscriptionMode::Standard);
    }

    #[test]
    fn test_extended_mode_never_guarded() {
        let decision = resolve_mode(TranscriptionMode::Extended, false, Some(3600.0)).unwrap();
        assert_eq!(decision.mode, TranscriptionMode::Extended);
        assert!(decision.advisory.is_none());
    }

    #[test]
    fn test_unknown_duration_skips_guard() {
        let decision = resolve_mode(TranscriptionMode::Standard, true, None).unwrap();
        assert_eq!(decision.mode, TranscriptionMode::Standard);
    }
}
