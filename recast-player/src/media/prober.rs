//! Audio duration probe using symphonia
//!
//! Opens a local media file, probes the container format, and reads the
//! default track's duration from its metadata — no decoding. Covers the
//! common broadcast formats (MP3, FLAC, AAC/MP4, Vorbis, WAV).

use crate::playback::ports::{DurationProbe, ProbeError};
use async_trait::async_trait;
use std::path::Path;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Metadata-only duration probe for local files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaProber;

impl SymphoniaProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DurationProbe for SymphoniaProber {
    async fn probe(&self, source: &str) -> Result<f64, ProbeError> {
        let path = source.to_string();
        // Container probing is blocking file I/O
        tokio::task::spawn_blocking(move || probe_file(&path))
            .await
            .map_err(|e| ProbeError::Open(format!("probe task failed: {}", e)))?
    }
}

fn probe_file(path: &str) -> Result<f64, ProbeError> {
    debug!("probing media duration: {}", path);

    let file = std::fs::File::open(path)
        .map_err(|e| ProbeError::Open(format!("{}: {}", path, e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // A filename extension helps the format registry guess the container
    let mut hint = Hint::new();
    if let Some(extension) = Path::new(path).extension() {
        if let Some(ext_str) = extension.to_str() {
            hint.with_extension(ext_str);
        }
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ProbeError::Unsupported(format!("{}: {}", path, e)))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProbeError::Unsupported(format!("{}: no audio track", path)))?;

    let params = &track.codec_params;
    match (params.time_base, params.n_frames) {
        (Some(time_base), Some(n_frames)) => {
            let time = time_base.calc_time(n_frames);
            Ok(time.seconds as f64 + time.frac)
        }
        _ => Err(ProbeError::Unsupported(format!(
            "{}: container reports no duration",
            path
        ))),
    }
}
