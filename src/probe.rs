// src/probe.rs
// Best-effort audio duration from container metadata

use crate::validate::AudioPayload;
use std::io::Cursor;
use std::sync::Arc;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;

/// Measure the audio duration of a payload by probing its container
/// metadata. Returns `None` when the container cannot be probed or carries
/// no frame count, in which case the duration guard is skipped and the
/// server-side checks take over.
pub fn probe_duration_secs(payload: &AudioPayload) -> Option<f64> {
    // Shares the payload buffer; only the Arc is cloned.
    let cursor = Cursor::new(Arc::clone(&payload.bytes));
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = payload.extension() {
        hint.with_extension(&ext);
    }

    let probed = match symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Duration probe failed for '{}': {}", payload.file_name, e);
            return None;
        }
    };

    let track = probed.format.default_track()?;
    let params = &track.codec_params;

    let n_frames = params.n_frames?;
    let time_base = params
        .time_base
        .or_else(|| params.sample_rate.map(|sr| TimeBase::new(1, sr)))?;

    let time = time_base.calc_time(n_frames);
    let secs = time.seconds as f64 + time.frac;

    tracing::info!(
        "Probed '{}': {:.2}s of audio",
        payload.file_name,
        secs
    );

    Some(secs)
}
