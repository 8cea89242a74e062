//! In-memory VideoRepository for the monolith deployment and tests.

use crate::domain::video::{Status, Video};
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<String, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut videos = self.videos.write().await;
        videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    async fn get_video(&self, id: &str) -> Result<Option<Video>, Box<dyn Error + Send + Sync>> {
        let videos = self.videos.read().await;
        Ok(videos.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: Status,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut videos = self.videos.write().await;
        let video = videos
            .get_mut(id)
            .ok_or_else(|| format!("video {} not found", id))?;
        if !video.status.can_transition_to(status) {
            return Err(format!(
                "invalid status transition {} -> {} for video {}",
                video.status, status, id
            )
            .into());
        }
        video.status = status;
        Ok(())
    }

    async fn set_processed_output(
        &self,
        id: &str,
        path: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut videos = self.videos.write().await;
        let video = videos
            .get_mut(id)
            .ok_or_else(|| format!("video {} not found", id))?;
        video.processed_path = Some(path.to_owned());
        Ok(())
    }

    async fn list_videos(&self) -> Result<Vec<Video>, Box<dyn Error + Send + Sync>> {
        let videos = self.videos.read().await;
        let mut all: Vec<Video> = videos.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let repo = InMemoryVideoRepository::new();
        let video = Video::new("aula 1", PathBuf::from("/uploads/aula1.mp4"));
        repo.create_video(&video).await.unwrap();

        let found = repo.get_video(&video.id).await.unwrap().unwrap();
        assert_eq!(found.title, "aula 1");
        assert_eq!(found.status, Status::Uploading);
    }

    #[tokio::test]
    async fn missing_video_is_none() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.get_video("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn status_updates_follow_the_state_machine() {
        let repo = InMemoryVideoRepository::new();
        let video = Video::new("aula", PathBuf::from("/uploads/a.mp4"));
        repo.create_video(&video).await.unwrap();

        repo.update_status(&video.id, Status::Processing).await.unwrap();
        repo.update_status(&video.id, Status::Ready).await.unwrap();

        // Terminal: no further transitions.
        assert!(repo.update_status(&video.id, Status::Error).await.is_err());
        let found = repo.get_video(&video.id).await.unwrap().unwrap();
        assert_eq!(found.status, Status::Ready);
    }

    #[tokio::test]
    async fn update_of_unknown_id_fails() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.update_status("ghost", Status::Processing).await.is_err());
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation_time() {
        let repo = InMemoryVideoRepository::new();
        let first = Video::new("primeiro", PathBuf::from("/a.mp4"));
        repo.create_video(&first).await.unwrap();
        let second = Video::new("segundo", PathBuf::from("/b.mp4"));
        repo.create_video(&second).await.unwrap();

        let all = repo.list_videos().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at <= all[1].created_at);
    }
}
