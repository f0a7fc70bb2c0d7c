use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::InFlight;
use crate::content::ContentRepository;
use crate::domain::{Identity, PostDraft, PostId};
use crate::error::ContentError;
use crate::session::IdentitySession;

/// Authoring form for a new post.
///
/// Only constructed for an authenticated identity, i.e. from the
/// `Render` branch of the route guard. `submit` re-reads the session and
/// refuses to write once `author` is no longer the signed-in identity.
pub struct CreatePostWorkflow {
    repo: ContentRepository,
    session: IdentitySession,
    author: Identity,
    draft: Mutex<PostDraft>,
    error: Mutex<Option<String>>,
    submitting: AtomicBool,
    closed: AtomicBool,
}

impl CreatePostWorkflow {
    pub fn new(repo: ContentRepository, session: IdentitySession, author: Identity) -> Self {
        Self {
            repo,
            session,
            author,
            draft: Mutex::new(PostDraft::default()),
            error: Mutex::new(None),
            submitting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn author(&self) -> &Identity {
        &self.author
    }

    pub fn draft(&self) -> PostDraft {
        self.draft.lock().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.draft.lock().title = title.into();
    }

    pub fn set_body(&self, body: impl Into<String>) {
        self.draft.lock().body = body.into();
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Store the draft as a new unpublished post.
    ///
    /// The form is cleared on success; on failure the fields are kept.
    pub async fn submit(&self) -> Result<PostId, ContentError> {
        let Some(_in_flight) = InFlight::begin(&self.submitting) else {
            return Err(ContentError::Busy);
        };
        let draft = self.draft();
        *self.error.lock() = None;

        let signed_in = self.session.identity();
        if signed_in.is_none_or(|identity| identity.id != self.author.id) {
            tracing::warn!(author_id = %self.author.id, "Refusing to create a post for a stale author");
            *self.error.lock() = Some("Please login to create a blog".to_string());
            return Err(ContentError::Authorization);
        }

        let result = self.repo.create(&draft, &self.author).await;
        if self.closed.load(Ordering::Acquire) {
            return result;
        }

        match &result {
            Ok(_) => *self.draft.lock() = PostDraft::default(),
            Err(e) => {
                let message = match e {
                    ContentError::Transport(_) => "Error creating blog. Please try again.",
                    other => other.user_message(),
                };
                *self.error.lock() = Some(message.to_string());
            }
        }
        result
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
