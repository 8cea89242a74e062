//! Media Tool Adapter: the [`MediaToolPort`] implemented over ffmpeg/ffprobe.

pub mod cmd;

use crate::ports::media::{MediaToolError, MediaToolPort};
use async_trait::async_trait;
use cmd::FfmpegRunner;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

pub use cmd::SystemFfmpeg;

/// Checks exit status and surfaces the tool's stderr on failure.
fn check(operation: &'static str, result: io::Result<Output>) -> Result<Output, MediaToolError> {
    let output = result.map_err(|e| MediaToolError::new(operation, e.to_string()))?;
    if !output.status.success() {
        return Err(MediaToolError::new(
            operation,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }
    Ok(output)
}

pub struct FfmpegTool<R> {
    runner: R,
}

impl<R: FfmpegRunner> FfmpegTool<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl<R: FfmpegRunner> MediaToolPort for FfmpegTool<R> {
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError> {
        let output = check("probe_duration", self.runner.probe_duration(path).await)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<f64>().map_err(|e| {
            MediaToolError::new(
                "probe_duration",
                format!("unparseable duration {:?}: {}", stdout.trim(), e),
            )
        })
    }

    async fn extract_audio(&self, video_path: &Path) -> Result<PathBuf, MediaToolError> {
        let audio_path = video_path.with_extension("wav");
        check(
            "extract_audio",
            self.runner.extract_audio(video_path, &audio_path).await,
        )?;
        Ok(audio_path)
    }

    async fn cut_audio_chunk(
        &self,
        audio_path: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output_path: &Path,
    ) -> Result<(), MediaToolError> {
        check(
            "cut_audio_chunk",
            self.runner
                .cut_audio(audio_path, start_seconds, duration_seconds, output_path)
                .await,
        )?;
        Ok(())
    }

    async fn cut_video_segments(
        &self,
        video_path: &Path,
        segment_seconds: f64,
        output_dir: &Path,
    ) -> Result<(), MediaToolError> {
        let pattern = output_dir.join("segment%03d.mp4");
        check(
            "cut_video_segments",
            self.runner
                .segment_video(video_path, segment_seconds, &pattern)
                .await,
        )?;
        Ok(())
    }

    async fn burn_subtitles(
        &self,
        segment_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<(), MediaToolError> {
        check(
            "burn_subtitles",
            self.runner
                .burn_subtitles(segment_path, subtitle_path, output_path)
                .await,
        )?;
        Ok(())
    }
}
