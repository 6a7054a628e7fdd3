use thiserror::Error;

/// Errors returned when opening a pinned events feed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PinnedTimelineError {
    /// The room cannot provide a pinned events timeline right now.
    #[error("pinned events timeline unavailable for room {room_id}")]
    Unavailable { room_id: String },
    /// The underlying SDK failed while building the timeline.
    #[error("pinned events timeline failed for room {room_id}: {message}")]
    Backend { room_id: String, message: String },
}

impl PinnedTimelineError {
    /// Room the failure refers to.
    pub fn room_id(&self) -> &str {
        match self {
            Self::Unavailable { room_id } | Self::Backend { room_id, .. } => room_id,
        }
    }
}
