use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Failure of one underlying media-tool invocation (non-zero exit,
/// unparseable output, or a spawn error).
#[derive(Debug)]
pub struct MediaToolError {
    pub operation: &'static str,
    pub stderr: String,
}

impl MediaToolError {
    pub fn new(operation: &'static str, stderr: impl Into<String>) -> Self {
        Self {
            operation,
            stderr: stderr.into(),
        }
    }
}

impl fmt::Display for MediaToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media tool '{}' failed: {}", self.operation, self.stderr)
    }
}

impl std::error::Error for MediaToolError {}

/// Capability boundary over the external media-processing engine.
///
/// The pipeline consumes exactly these operations; everything else the engine
/// can do stays behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Container duration of a media file, in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError>;

    /// Extract the full audio track as mono 16 kHz signed 16-bit PCM.
    /// Returns the path of the written audio file.
    async fn extract_audio(&self, video_path: &Path) -> Result<PathBuf, MediaToolError>;

    /// Cut a bounded slice out of an audio file.
    async fn cut_audio_chunk(
        &self,
        audio_path: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output_path: &Path,
    ) -> Result<(), MediaToolError>;

    /// Cut the video into fixed-length segments, written into `output_dir`
    /// with numbered filenames. The caller lists the results.
    async fn cut_video_segments(
        &self,
        video_path: &Path,
        segment_seconds: f64,
        output_dir: &Path,
    ) -> Result<(), MediaToolError>;

    /// Burn a subtitle track into a segment: re-encode video, copy audio,
    /// embed the track as a soft text stream.
    async fn burn_subtitles(
        &self,
        segment_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<(), MediaToolError>;
}
