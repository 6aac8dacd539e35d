// src/export.rs
// Derived representations of a completed transcription

use crate::api::TranscriptionResult;
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Full text only, byte-for-byte as the server returned it.
    Text,
    /// The entire result, pretty-printed.
    Json,
    /// SubRip subtitles derived from the segment timings.
    Srt,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Srt => "srt",
        }
    }
}

/// Render a completed result in the requested format. SRT without segments
/// is a reported error, never a panic.
pub fn render(result: &TranscriptionResult, format: ExportFormat) -> Result<String, ClientError> {
    match format {
        ExportFormat::Text => Ok(result.transcription.clone()),
        ExportFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| ClientError::Validation(format!("Failed to serialize result: {}", e))),
        ExportFormat::Srt => render_srt(result),
    }
}

/// Render, then write to disk. Nothing is written when rendering fails.
pub fn write_to_file(
    result: &TranscriptionResult,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ClientError> {
    let rendered = render(result, format)?;
    fs::write(path, rendered)
        .map_err(|e| ClientError::Validation(format!("Failed to write {}: {}", path.display(), e)))
}

fn render_srt(result: &TranscriptionResult) -> Result<String, ClientError> {
    let segments = result.segments();
    if segments.is_empty() {
        return Err(ClientError::Validation(
            "Transcription has no segments; SRT export needs per-segment timings".to_string(),
        ));
    }

    let mut out = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let _ = writeln!(out, "{}", index + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            srt_timestamp(segment.start),
            srt_timestamp(segment.end)
        );
        let _ = writeln!(out, "{}", segment.text);
        let _ = writeln!(out);
    }

    Ok(out)
}

/// `HH:MM:SS,mmm`, rounded to millisecond precision.
fn srt_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_secs = total_millis / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Segment;
    use pretty_assertions::assert_eq;

    fn result_with_segments(segments: Option<Vec<Segment>>) -> TranscriptionResult {
        TranscriptionResult {
            transcription: "a b".to_string(),
            language: "eng_Latn".to_string(),
            processing_time: 1.5,
            audio_duration: 10.0,
            segments_count: segments.as_ref().map(|s| s.len() as u32),
            segments,
            request_id: "req-42".to_string(),
        }
    }

    #[test]
    fn test_text_export_is_verbatim() {
        let mut result = result_with_segments(None);
        result.transcription = "  exact text,  spacing preserved  ".to_string();
        let rendered = render(&result, ExportFormat::Text).unwrap();
        assert_eq!(rendered, "  exact text,  spacing preserved  ");
    }

    #[test]
    fn test_json_export_contains_whole_result() {
        let result = result_with_segments(Some(vec![Segment {
            start: 0.0,
            end: 10.0,
            text: "a b".to_string(),
        }]));
        let rendered = render(&result, ExportFormat::Json).unwrap();

        let parsed: TranscriptionResult = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.request_id, "req-42");
        assert_eq!(parsed.segments().len(), 1);
        // Pretty-printed, not a single line
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn test_srt_two_segments() {
        let result = result_with_segments(Some(vec![
            Segment {
                start: 0.0,
                end: 5.0,
                text: "a".to_string(),
            },
            Segment {
                start: 5.0,
                end: 10.0,
                text: "b".to_string(),
            },
        ]));

        let rendered = render(&result, ExportFormat::Srt).unwrap();
        assert_eq!(
            rendered,
            "1\n00:00:00,000 --> 00:00:05,000\na\n\n2\n00:00:05,000 --> 00:00:10,000\nb\n\n"
        );
    }

    #[test]
    fn test_srt_without_segments_is_an_error() {
        let none = result_with_segments(None);
        assert!(render(&none, ExportFormat::Srt).is_err());

        let empty = result_with_segments(Some(Vec::new()));
        assert!(render(&empty, ExportFormat::Srt).is_err());
    }

    #[test]
    fn test_srt_export_writes_no_file_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitles.srt");

        let result = result_with_segments(None);
        assert!(write_to_file(&result, ExportFormat::Srt, &path).is_err());
        assert!(!path.exists(), "no file may be written on a failed export");
    }

    #[test]
    fn test_write_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");

        let result = result_with_segments(None);
        write_to_file(&result, ExportFormat::Text, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a b");
    }

    #[test]
    fn test_timestamp_millisecond_rounding() {
        assert_eq!(srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(srt_timestamp(1.2345), "00:00:01,235"); // rounds, not truncates
        assert_eq!(srt_timestamp(59.9996), "00:01:00,000");
        assert_eq!(srt_timestamp(3661.5), "01:01:01,500");
        assert_eq!(srt_timestamp(-1.0), "00:00:00,000");
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Text.extension(), "txt");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::Srt.extension(), "srt");
    }
}
