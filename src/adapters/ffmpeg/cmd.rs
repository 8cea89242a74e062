//! Raw ffmpeg/ffprobe invocations behind a mockable trait.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Language tag embedded on the burned subtitle stream.
pub const SUBTITLE_LANGUAGE_TAG: &str = "por";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FfmpegRunner: Send + Sync {
    async fn probe_duration(&self, path: &Path) -> io::Result<Output>;

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> io::Result<Output>;

    async fn cut_audio(
        &self,
        audio_path: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output_path: &Path,
    ) -> io::Result<Output>;

    async fn segment_video(
        &self,
        video_path: &Path,
        segment_seconds: f64,
        output_pattern: &Path,
    ) -> io::Result<Output>;

    async fn burn_subtitles(
        &self,
        segment_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> io::Result<Output>;
}

/// Runs the real binaries found at the configured paths.
pub struct SystemFfmpeg {
    ffmpeg: String,
    ffprobe: String,
}

impl SystemFfmpeg {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

#[async_trait]
impl FfmpegRunner for SystemFfmpeg {
    async fn probe_duration(&self, path: &Path) -> io::Result<Output> {
        Command::new(&self.ffprobe)
            .arg("-v").arg("error")
            .arg("-show_entries").arg("format=duration")
            .arg("-of").arg("default=noprint_wrappers=1:nokey=1")
            .arg(path)
            .output()
            .await
    }

    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> io::Result<Output> {
        Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i").arg(video_path)
            .arg("-acodec").arg("pcm_s16le")
            .arg("-ac").arg("1")
            .arg("-ar").arg("16000")
            .arg(audio_path)
            .output()
            .await
    }

    async fn cut_audio(
        &self,
        audio_path: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        output_path: &Path,
    ) -> io::Result<Output> {
        Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-ss").arg(start_seconds.to_string())
            .arg("-i").arg(audio_path)
            .arg("-t").arg(duration_seconds.to_string())
            .arg(output_path)
            .output()
            .await
    }

    async fn segment_video(
        &self,
        video_path: &Path,
        segment_seconds: f64,
        output_pattern: &Path,
    ) -> io::Result<Output> {
        Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i").arg(video_path)
            .arg("-f").arg("segment")
            .arg("-segment_time").arg(segment_seconds.to_string())
            .arg("-reset_timestamps").arg("1")
            .arg(output_pattern)
            .output()
            .await
    }

    async fn burn_subtitles(
        &self,
        segment_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> io::Result<Output> {
        Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i").arg(segment_path)
            .arg("-i").arg(subtitle_path)
            .arg("-c:v").arg("libx264")
            .arg("-c:a").arg("copy")
            .arg("-c:s").arg("mov_text")
            .arg("-metadata:s:s:0")
            .arg(format!("language={}", SUBTITLE_LANGUAGE_TAG))
            .arg(output_path)
            .output()
            .await
    }
}
