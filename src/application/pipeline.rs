//! Pipeline Orchestrator: raw upload in, subtitled segments out.
//!
//! Stage order is fixed: extract audio, transcribe chunk by chunk, cut the
//! video, then burn a per-segment subtitle track. Video cutting shares only
//! the read-only source with the audio branch and runs concurrently with it;
//! per-segment burning fans out once both branches are done. Chunk
//! transcription itself stays strictly sequential so the concatenated text
//! keeps the word order of the original audio.

use crate::domain::av::audio::split_audio;
use crate::domain::av::video::split_video;
use crate::domain::subtitles::SubtitleTrack;
use crate::domain::transcript::TranscriptMap;
use crate::domain::video::{Status, Video};
use crate::ports::media::MediaToolPort;
use crate::ports::repository::VideoRepository;
use crate::ports::speech::SpeechPort;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadJob,
    ExtractAudio,
    Transcribe,
    SegmentVideo,
    BurnSubtitles,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::LoadJob => "load-job",
            Stage::ExtractAudio => "extract-audio",
            Stage::Transcribe => "transcribe",
            Stage::SegmentVideo => "segment-video",
            Stage::BurnSubtitles => "burn-subtitles",
            Stage::Persist => "persist",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub enum PipelineError {
    JobNotFound(String),
    Stage {
        stage: Stage,
        cause: Box<dyn Error + Send + Sync>,
    },
}

impl PipelineError {
    fn at(stage: Stage, cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        PipelineError::Stage {
            stage,
            cause: cause.into(),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::JobNotFound(_) => None,
            PipelineError::Stage { stage, .. } => Some(*stage),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::JobNotFound(id) => write!(f, "video {} not found", id),
            PipelineError::Stage { stage, cause } => {
                write!(f, "pipeline failed at {}: {}", stage, cause)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::JobNotFound(_) => None,
            PipelineError::Stage { cause, .. } => Some(cause.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Cut granularity for playback segments.
    pub video_segment_seconds: f64,
    /// Chunk granularity for transcription input; independent of the video
    /// segment length.
    pub audio_chunk_seconds: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            video_segment_seconds: 60.0,
            audio_chunk_seconds: 59.0,
        }
    }
}

pub struct PipelineService<M, S, R> {
    media: M,
    speech: S,
    repo: R,
    settings: PipelineSettings,
}

impl<M, S, R> PipelineService<M, S, R>
where
    M: MediaToolPort,
    S: SpeechPort,
    R: VideoRepository,
{
    pub fn new(media: M, speech: S, repo: R, settings: PipelineSettings) -> Self {
        Self {
            media,
            speech,
            repo,
            settings,
        }
    }

    /// Run the full pipeline for one video id.
    ///
    /// Every status transition is persisted before the next stage starts, so
    /// pollers always see the true current state. On failure the status
    /// becomes `error` and partial files stay on disk.
    pub async fn run(&self, video_id: &str) -> Result<Vec<PathBuf>, PipelineError> {
        let video = self
            .repo
            .get_video(video_id)
            .await
            .map_err(|e| PipelineError::at(Stage::LoadJob, e))?
            .ok_or_else(|| PipelineError::JobNotFound(video_id.to_owned()))?;

        self.repo
            .update_status(video_id, Status::Processing)
            .await
            .map_err(|e| PipelineError::at(Stage::Persist, e))?;
        info!(video = video_id, source = %video.original_path.display(), "processing started");

        match self.process(&video).await {
            Ok(outputs) => {
                if let Err(e) = self.persist_ready(video_id, &outputs).await {
                    self.mark_error(video_id).await;
                    return Err(e);
                }
                info!(video = video_id, segments = outputs.len(), "processing finished");
                Ok(outputs)
            }
            Err(e) => {
                warn!(video = video_id, error = %e, "processing failed");
                self.mark_error(video_id).await;
                Err(e)
            }
        }
    }

    /// The first output path is persisted as the representative processed
    /// URL before the status flips, so a `ready` record always carries one.
    async fn persist_ready(
        &self,
        video_id: &str,
        outputs: &[PathBuf],
    ) -> Result<(), PipelineError> {
        if let Some(first) = outputs.first() {
            self.repo
                .set_processed_output(video_id, &first.to_string_lossy())
                .await
                .map_err(|e| PipelineError::at(Stage::Persist, e))?;
        }
        self.repo
            .update_status(video_id, Status::Ready)
            .await
            .map_err(|e| PipelineError::at(Stage::Persist, e))
    }

    async fn process(&self, video: &Video) -> Result<Vec<PathBuf>, PipelineError> {
        // The two branches only read the source file, so they can overlap.
        // Intermediate files live under a directory keyed by the job id, so
        // concurrent runs never touch each other's chunks or segments.
        let work_dir = job_work_dir(video);
        let chunks_dir = work_dir.join("chunks");
        let transcript_branch = self.transcribe_source(&video.original_path, &chunks_dir);
        let segment_branch = async {
            split_video(
                &self.media,
                &video.original_path,
                self.settings.video_segment_seconds,
                &work_dir.join("segments"),
            )
            .await
            .map_err(|e| PipelineError::at(Stage::SegmentVideo, e))
        };
        let (transcript, segments) = tokio::try_join!(transcript_branch, segment_branch)?;

        // Word-rate alignment over the whole playback window; per-segment
        // burns fan out, results collected in segment order.
        let total_window = segments.len() as f64 * self.settings.video_segment_seconds;
        let map = TranscriptMap::new(&transcript, total_window);
        let burns = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| self.subtitle_segment(video, &map, index, segment));
        futures::future::try_join_all(burns).await
    }

    /// Extract the audio track and transcribe it chunk by chunk, in order.
    async fn transcribe_source(
        &self,
        source: &Path,
        chunk_dir: &Path,
    ) -> Result<String, PipelineError> {
        let audio_path = self
            .media
            .extract_audio(source)
            .await
            .map_err(|e| PipelineError::at(Stage::ExtractAudio, e))?;
        info!(audio = %audio_path.display(), "audio extracted");

        let chunks = split_audio(
            &self.media,
            &audio_path,
            self.settings.audio_chunk_seconds,
            chunk_dir,
        )
        .await
        .map_err(|e| PipelineError::at(Stage::Transcribe, e))?;
        info!(chunks = chunks.len(), "audio split for transcription");

        let mut parts = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            info!(chunk = i + 1, total = chunks.len(), "transcribing chunk");
            let text = self
                .speech
                .transcribe(&chunk.path)
                .await
                .map_err(|e| PipelineError::at(Stage::Transcribe, e))?;
            parts.push(text);
        }
        Ok(parts.join(" ").trim().to_owned())
    }

    /// Build and burn the subtitle track for one segment. A segment whose
    /// transcript slice yields no cues passes through unmodified.
    async fn subtitle_segment(
        &self,
        video: &Video,
        map: &TranscriptMap,
        index: usize,
        segment: &Path,
    ) -> Result<PathBuf, PipelineError> {
        let window = self.settings.video_segment_seconds;
        let slice = map.slice_window(index as f64 * window, (index + 1) as f64 * window);

        let Some(track) = SubtitleTrack::build(&slice, window) else {
            info!(segment = index, "no subtitles for segment, passing through");
            return Ok(segment.to_path_buf());
        };

        let srt_path = std::env::temp_dir().join(format!("subtitles_{}_{}.srt", video.id, index));
        track
            .write_to(&srt_path)
            .await
            .map_err(|e| PipelineError::at(Stage::BurnSubtitles, e))?;

        let output = subtitled_path(segment);
        self.media
            .burn_subtitles(segment, &srt_path, &output)
            .await
            .map_err(|e| PipelineError::at(Stage::BurnSubtitles, e))?;

        // Best-effort: a leftover track file is not worth failing the run.
        if let Err(e) = tokio::fs::remove_file(&srt_path).await {
            warn!(path = %srt_path.display(), error = %e, "could not remove subtitle track");
        }
        info!(segment = index, output = %output.display(), "subtitles burned");
        Ok(output)
    }

    async fn mark_error(&self, video_id: &str) {
        if let Err(e) = self.repo.update_status(video_id, Status::Error).await {
            warn!(video = video_id, error = %e, "could not persist error status");
        }
    }
}

/// Working directory for one run's intermediate files, keyed by the job id.
/// Lives next to the uploaded source.
fn job_work_dir(video: &Video) -> PathBuf {
    video
        .original_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&video.id)
}

/// `segment000.mp4` -> `segment000_subtitled.mp4`, next to the original.
fn subtitled_path(segment: &Path) -> PathBuf {
    let stem = segment
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    segment.with_file_name(format!("{}_subtitled.mp4", stem))
}
