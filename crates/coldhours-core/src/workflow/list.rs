use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::InFlight;
use crate::content::ContentRepository;
use crate::domain::Post;
use crate::error::ContentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded(Vec<Post>),
    /// Load failed; the view offers a retry.
    Failed { message: String },
}

/// Public post list.
pub struct PostListWorkflow {
    repo: ContentRepository,
    state: Mutex<ListState>,
    loading: AtomicBool,
    closed: AtomicBool,
}

impl PostListWorkflow {
    pub fn new(repo: ContentRepository) -> Self {
        Self {
            repo,
            state: Mutex::new(ListState::Loading),
            loading: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ListState {
        self.state.lock().clone()
    }

    pub fn can_retry(&self) -> bool {
        matches!(*self.state.lock(), ListState::Failed { .. })
    }

    /// Fetch a fresh snapshot of all posts.
    pub async fn load(&self) -> Result<(), ContentError> {
        let Some(_in_flight) = InFlight::begin(&self.loading) else {
            return Err(ContentError::Busy);
        };
        *self.state.lock() = ListState::Loading;

        let result = self.repo.list().await;
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Discarding post list response for closed view");
            return result.map(|_| ());
        }

        match result {
            Ok(posts) => {
                *self.state.lock() = ListState::Loaded(posts);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load posts");
                *self.state.lock() = ListState::Failed {
                    message: "Failed to load blogs. Please try again later.".to_string(),
                };
                Err(e)
            }
        }
    }

    pub async fn retry(&self) -> Result<(), ContentError> {
        if !self.can_retry() {
            return Err(ContentError::InvalidTransition("retry is only offered after a failure"));
        }
        self.load().await
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
