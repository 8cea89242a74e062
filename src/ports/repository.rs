use crate::domain::video::{Status, Video};
use async_trait::async_trait;
use std::error::Error;

/// Record store for uploaded videos.
///
/// The orchestrator is the sole writer while a run is in flight; status reads
/// may come from any poller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Persist a newly uploaded video record.
    async fn create_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Fetch a video record by id.
    async fn get_video(&self, id: &str) -> Result<Option<Video>, Box<dyn Error + Send + Sync>>;

    /// Persist a status transition.
    async fn update_status(
        &self,
        id: &str,
        status: Status,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Record the representative processed output path.
    async fn set_processed_output(
        &self,
        id: &str,
        path: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// All records, for the list surface.
    async fn list_videos(&self) -> Result<Vec<Video>, Box<dyn Error + Send + Sync>>;
}
