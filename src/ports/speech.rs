use async_trait::async_trait;
use std::error::Error;
use std::path::Path;

/// Speech-recognition boundary: one bounded audio chunk in, plain text out.
///
/// Implementations are best-effort: a failing recognition request degrades to
/// an empty string (logged), so one unreachable chunk never aborts the whole
/// transcript. Errors from this trait mean the chunk itself could not be
/// handled (e.g. the file is unreadable) and do abort the run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechPort: Send + Sync {
    async fn transcribe(&self, chunk_path: &Path)
        -> Result<String, Box<dyn Error + Send + Sync>>;
}
