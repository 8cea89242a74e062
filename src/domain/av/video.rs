//! Video Segmenter: cut the source video into fixed-length playback segments.

use crate::ports::media::{MediaToolError, MediaToolPort};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SegmentError {
    /// The segmenting invocation itself failed.
    Tool(MediaToolError),
    /// The tool reported success but the output directory holds no segments.
    NoSegments(PathBuf),
    Io(std::io::Error),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::Tool(e) => write!(f, "video segmenting failed: {}", e),
            SegmentError::NoSegments(dir) => {
                write!(f, "no segments produced in {}", dir.display())
            }
            SegmentError::Io(e) => write!(f, "segment directory error: {}", e),
        }
    }
}

impl std::error::Error for SegmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SegmentError::Tool(e) => Some(e),
            SegmentError::NoSegments(_) => None,
            SegmentError::Io(e) => Some(e),
        }
    }
}

/// Cut `video_path` into segments of `segment_seconds` inside `segment_dir`,
/// then list the produced files. The caller hands each run its own directory,
/// so a concurrent run's segments never show up in the listing. Filenames
/// carry a fixed-width numeric suffix, so a lexical sort is playback order.
pub async fn split_video(
    tool: &impl MediaToolPort,
    video_path: &Path,
    segment_seconds: f64,
    segment_dir: &Path,
) -> Result<Vec<PathBuf>, SegmentError> {
    tokio::fs::create_dir_all(segment_dir)
        .await
        .map_err(SegmentError::Io)?;

    tool.cut_video_segments(video_path, segment_seconds, segment_dir)
        .await
        .map_err(SegmentError::Tool)?;

    let mut segments = Vec::new();
    let mut entries = tokio::fs::read_dir(segment_dir)
        .await
        .map_err(SegmentError::Io)?;
    while let Some(entry) = entries.next_entry().await.map_err(SegmentError::Io)? {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("segment") && name.ends_with(".mp4") {
            segments.push(path);
        }
    }
    segments.sort();

    if segments.is_empty() {
        return Err(SegmentError::NoSegments(segment_dir.to_path_buf()));
    }
    tracing::info!(count = segments.len(), "video segmented");
    Ok(segments)
}
