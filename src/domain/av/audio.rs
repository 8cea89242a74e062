//! Audio Segmenter: split an audio track into fixed-length chunks sized for
//! the speech service's input limits.

use crate::ports::media::{MediaToolError, MediaToolPort};
use std::fmt;
use std::path::{Path, PathBuf};

/// A bounded slice of the extracted audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub path: PathBuf,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug)]
pub enum AudioSplitError {
    /// Chunk length must be positive.
    InvalidChunkLength(f64),
    /// Total duration could not be determined.
    Probe(MediaToolError),
    /// A chunk extraction failed; the whole split aborts.
    Extract(MediaToolError),
    Io(std::io::Error),
}

impl fmt::Display for AudioSplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSplitError::InvalidChunkLength(v) => {
                write!(f, "invalid chunk length: {}s", v)
            }
            AudioSplitError::Probe(e) => write!(f, "audio duration probe failed: {}", e),
            AudioSplitError::Extract(e) => write!(f, "chunk extraction failed: {}", e),
            AudioSplitError::Io(e) => write!(f, "chunk directory error: {}", e),
        }
    }
}

impl std::error::Error for AudioSplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioSplitError::InvalidChunkLength(_) => None,
            AudioSplitError::Probe(e) | AudioSplitError::Extract(e) => Some(e),
            AudioSplitError::Io(e) => Some(e),
        }
    }
}

/// Split `audio_path` into contiguous chunks of `chunk_seconds`, the last one
/// covering whatever remains. Chunks are written into `chunk_dir`, numbered
/// in playback order; the caller hands each run its own directory so
/// concurrent runs never share chunk paths.
pub async fn split_audio(
    tool: &impl MediaToolPort,
    audio_path: &Path,
    chunk_seconds: f64,
    chunk_dir: &Path,
) -> Result<Vec<AudioChunk>, AudioSplitError> {
    if chunk_seconds <= 0.0 {
        return Err(AudioSplitError::InvalidChunkLength(chunk_seconds));
    }

    let total = tool
        .probe_duration(audio_path)
        .await
        .map_err(AudioSplitError::Probe)?;

    tokio::fs::create_dir_all(chunk_dir)
        .await
        .map_err(AudioSplitError::Io)?;

    let mut chunks = Vec::new();
    let mut index = 0usize;
    loop {
        let start = index as f64 * chunk_seconds;
        if start >= total {
            break;
        }
        let duration = (total - start).min(chunk_seconds);
        let path = chunk_dir.join(format!("chunk_{:03}.wav", index));
        tool.cut_audio_chunk(audio_path, start, duration, &path)
            .await
            .map_err(AudioSplitError::Extract)?;
        tracing::debug!(chunk = index, start, duration, "audio chunk created");
        chunks.push(AudioChunk {
            path,
            start,
            duration,
        });
        index += 1;
    }

    Ok(chunks)
}
