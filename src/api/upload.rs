// src/api/upload.rs
// Multipart file part that reports transfer progress as chunks are pulled

use crate::error::ClientError;
use crate::validate::AudioPayload;
use reqwest::multipart;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Called with (bytes sent so far, total bytes) while the body streams out.
pub type ByteProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

/// Build the multipart `file` part from a payload, splitting it into chunks
/// so the progress callback fires as the HTTP stack pulls each chunk onto
/// the wire.
pub fn progress_part(
    payload: &AudioPayload,
    on_progress: ByteProgress,
) -> Result<multipart::Part, ClientError> {
    let total = payload.size();
    let chunks: Vec<Vec<u8>> = payload
        .bytes
        .chunks(CHUNK_SIZE)
        .map(|c| c.to_vec())
        .collect();

    let sent = Arc::new(AtomicU64::new(0));
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let so_far = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        on_progress(so_far, total);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(payload.file_name.clone())
        .mime_str(payload.mime_type())
        .map_err(|e| ClientError::Validation(e.to_string()))
}

/// Percentage helper shared by the upload and polling progress paths.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
