use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Processing state of one uploaded video.
///
/// Transitions are forward-only; `Ready` and `Error` are terminal for a run,
/// and `Error` is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Uploading,
    Processing,
    Ready,
    Error,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Ready | Status::Error)
    }

    pub fn can_transition_to(&self, next: Status) -> bool {
        match (self, next) {
            (Status::Uploading, Status::Processing) => true,
            (Status::Processing, Status::Ready) => true,
            (current, Status::Error) if !current.is_terminal() => true,
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Uploading => "uploading",
            Status::Processing => "processing",
            Status::Ready => "ready",
            Status::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One uploaded video as tracked by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub original_path: PathBuf,
    /// Representative processed output, set when the run reaches `Ready`.
    pub processed_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn new(title: impl Into<String>, original_path: PathBuf) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            status: Status::Uploading,
            original_path,
            processed_path: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Status::Uploading.can_transition_to(Status::Processing));
        assert!(Status::Processing.can_transition_to(Status::Ready));
    }

    #[test]
    fn error_is_reachable_from_any_non_terminal_state() {
        assert!(Status::Uploading.can_transition_to(Status::Error));
        assert!(Status::Processing.can_transition_to(Status::Error));
    }

    #[test]
    fn terminal_states_do_not_transition() {
        assert!(!Status::Ready.can_transition_to(Status::Processing));
        assert!(!Status::Ready.can_transition_to(Status::Error));
        assert!(!Status::Error.can_transition_to(Status::Processing));
        assert!(!Status::Error.can_transition_to(Status::Ready));
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert!(!Status::Processing.can_transition_to(Status::Uploading));
        assert!(!Status::Uploading.can_transition_to(Status::Ready));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Status::Processing).unwrap(),
            "\"processing\""
        );
    }

    #[test]
    fn new_video_starts_uploading() {
        let video = Video::new("clip", PathBuf::from("/tmp/clip.mp4"));
        assert_eq!(video.status, Status::Uploading);
        assert!(video.processed_path.is_none());
        assert!(!video.id.is_empty());
    }
}
