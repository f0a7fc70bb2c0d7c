//! Content-level error types.

use thiserror::Error;

use crate::ports::StoreError;

/// Failures of post reads, writes and workflow actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// Empty required field; raised before any remote call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requester is not the post's author.
    #[error("Only the author may change this post")]
    Authorization,

    #[error("Post not found: {id}")]
    NotFound { id: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    /// A stored document does not match the fixed schema.
    #[error("Document {id} is malformed: {reason}")]
    Schema { id: String, reason: String },

    /// A request from the same workflow is still in flight.
    #[error("A request is already in flight")]
    Busy,

    /// The action is not available in the workflow's current state.
    #[error("Action not available: {0}")]
    InvalidTransition(&'static str),
}

impl ContentError {
    /// Map a store failure for document `id`.
    pub fn from_store(err: StoreError, id: &str) -> Self {
        match err {
            StoreError::NotFound => ContentError::NotFound { id: id.to_string() },
            StoreError::PermissionDenied => ContentError::Authorization,
            other => ContentError::Transport(other.to_string()),
        }
    }

    /// Message shown to the acting user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContentError::Validation(_) => "Please fill in all fields",
            ContentError::Authorization => "Only the author can change this blog.",
            ContentError::NotFound { .. } => "Blog not found",
            ContentError::Transport(_) => "Network error. Please try again.",
            ContentError::Schema { .. } => "This blog could not be read.",
            ContentError::Busy => "Please wait for the current request to finish.",
            ContentError::InvalidTransition(_) => "That action is not available right now.",
        }
    }
}
