// src/validate.rs
// Client-side payload validation, run before any network call

use crate::error::ClientError;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024; // 100 MiB
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["mp3", "wav", "mp4", "webm", "ogg", "m4a", "flac"];

/// Candidate audio file held in memory. Immutable once submitted.
///
/// The bytes are shared, so clones and the duration probe reuse one buffer
/// rather than copying the file.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

impl AudioPayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// MIME type for the multipart part, derived from the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("mp4") => "video/mp4",
            Some("webm") => "video/webm",
            Some("ogg") => "audio/ogg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            _ => "application/octet-stream",
        }
    }
}

/// Validate a candidate payload against the size ceiling and the accepted
/// format whitelist. Pure function, no side effects; the server re-checks
/// everything independently.
pub fn validate_payload(payload: &AudioPayload) -> Result<(), ClientError> {
    if payload.size() == 0 {
        return Err(ClientError::Validation("Empty file".to_string()));
    }

    if payload.size() > MAX_FILE_SIZE {
        return Err(ClientError::Validation(format!(
            "File too large: {:.1} MB exceeds the {} MB limit",
            payload.size() as f64 / (1024.0 * 1024.0),
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    match payload.extension() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ClientError::Validation(format!(
            "Unsupported file type '.{}'. Accepted: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        ))),
        None => Err(ClientError::Validation(
            "File has no extension; cannot determine audio format".to_string(),
        )),
    }
}

/// Validate a language tag of the form `eng_Latn` (ISO 639-3 + script).
pub fn validate_language_tag(language: &str) -> Result<(), ClientError> {
    let trimmed = language.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "Language is required. Pick one from the /languages list".to_string(),
        ));
    }

    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| {
        Regex::new(r"^[a-z]{3}_[A-Z][a-z]{3}$").expect("valid language tag regex")
    });

    if !re.is_match(trimmed) {
        return Err(ClientError::Validation(format!(
            "Malformed language tag '{}'. Expected a code like 'eng_Latn'",
            trimmed
        )));
    }

    Ok(())
}
