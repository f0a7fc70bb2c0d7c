use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{InFlight, POST_LIST_PATH};
use crate::content::ContentRepository;
use crate::domain::{Identity, Post, PostDraft, PostId};
use crate::error::ContentError;
use crate::session::IdentitySession;

/// Edit state of an opened post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing(PostDraft),
    /// The draft is being written; resubmission is rejected.
    Saving(PostDraft),
}

/// A loaded post and what the viewer is doing with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPanel {
    /// Last known-good remote state.
    pub post: Post,
    pub mode: EditMode,
    /// A publish toggle or delete is in flight.
    pub pending: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    /// Terminal; the view links back to the list.
    NotFound,
    Failed { message: String },
    Ready(PostPanel),
    /// Terminal; the view navigates back to the list.
    Deleted,
}

impl DetailState {
    pub fn panel(&self) -> Option<&PostPanel> {
        match self {
            DetailState::Ready(panel) => Some(panel),
            _ => None,
        }
    }

    /// Where the view should send the visitor, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            DetailState::NotFound | DetailState::Deleted => Some(POST_LIST_PATH),
            _ => None,
        }
    }
}

/// Detail view of one post, with author-only edit, publish and delete.
pub struct PostDetailWorkflow {
    id: PostId,
    repo: ContentRepository,
    session: IdentitySession,
    state: Mutex<DetailState>,
    loading: AtomicBool,
    closed: AtomicBool,
}

impl PostDetailWorkflow {
    pub fn new(id: PostId, repo: ContentRepository, session: IdentitySession) -> Self {
        Self {
            id,
            repo,
            session,
            state: Mutex::new(DetailState::Loading),
            loading: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.lock().clone()
    }

    pub fn viewer(&self) -> Option<Identity> {
        self.session.identity()
    }

    /// Whether the author-only actions should be offered.
    pub fn is_author(&self) -> bool {
        let Some(viewer) = self.viewer() else {
            return false;
        };
        self.state
            .lock()
            .panel()
            .is_some_and(|panel| panel.post.is_authored_by(&viewer))
    }

    pub async fn load(&self) -> Result<(), ContentError> {
        let Some(_in_flight) = InFlight::begin(&self.loading) else {
            return Err(ContentError::Busy);
        };
        {
            let mut state = self.state.lock();
            if state
                .panel()
                .is_some_and(|panel| panel.pending || matches!(panel.mode, EditMode::Saving(_)))
            {
                return Err(ContentError::Busy);
            }
            *state = DetailState::Loading;
        }

        let result = self.repo.get(&self.id).await;
        if self.closed.load(Ordering::Acquire) {
            return result.map(|_| ());
        }

        let mut state = self.state.lock();
        match result {
            Ok(post) => {
                *state = DetailState::Ready(PostPanel {
                    post,
                    mode: EditMode::Viewing,
                    pending: false,
                    error: None,
                    notice: None,
                });
                Ok(())
            }
            Err(e @ ContentError::NotFound { .. }) => {
                *state = DetailState::NotFound;
                Err(e)
            }
            Err(e) => {
                tracing::warn!(post_id = %self.id, error = %e, "Failed to load post");
                *state = DetailState::Failed {
                    message: "Failed to load blog".to_string(),
                };
                Err(e)
            }
        }
    }

    pub fn begin_edit(&self) -> Result<(), ContentError> {
        let viewer = self.viewer();
        let mut state = self.state.lock();
        let panel = ready_panel(&mut state)?;

        if panel.mode != EditMode::Viewing || panel.pending {
            return Err(ContentError::InvalidTransition("edit is only available while viewing"));
        }
        if !viewer.is_some_and(|viewer| panel.post.is_authored_by(&viewer)) {
            return Err(ContentError::Authorization);
        }

        panel.mode = EditMode::Editing(PostDraft::from_post(&panel.post));
        panel.error = None;
        panel.notice = None;
        Ok(())
    }

    /// Replace the in-progress draft.
    pub fn set_draft(&self, draft: PostDraft) -> Result<(), ContentError> {
        let mut state = self.state.lock();
        let panel = ready_panel(&mut state)?;
        match &mut panel.mode {
            EditMode::Editing(current) => {
                *current = draft;
                Ok(())
            }
            EditMode::Saving(_) => Err(ContentError::Busy),
            EditMode::Viewing => Err(ContentError::InvalidTransition("not editing")),
        }
    }

    /// Discard the draft and show the last known-good post again.
    pub fn cancel_edit(&self) -> Result<(), ContentError> {
        let mut state = self.state.lock();
        let panel = ready_panel(&mut state)?;
        match panel.mode {
            EditMode::Editing(_) => {
                panel.mode = EditMode::Viewing;
                panel.error = None;
                Ok(())
            }
            EditMode::Saving(_) => Err(ContentError::Busy),
            EditMode::Viewing => Err(ContentError::InvalidTransition("not editing")),
        }
    }

    /// Write the draft; the panel shows the new title/body only once stored.
    pub async fn save(&self) -> Result<(), ContentError> {
        let (post, draft, viewer) = {
            let viewer = self.viewer();
            let mut state = self.state.lock();
            let panel = ready_panel(&mut state)?;
            let draft = match &panel.mode {
                EditMode::Editing(draft) => draft.clone(),
                EditMode::Saving(_) => return Err(ContentError::Busy),
                EditMode::Viewing => return Err(ContentError::InvalidTransition("not editing")),
            };
            let Some(viewer) = viewer else {
                panel.error = Some(ContentError::Authorization.user_message().to_string());
                return Err(ContentError::Authorization);
            };
            if let Err(e) = draft.validate() {
                panel.error = Some(e.user_message().to_string());
                return Err(e);
            }
            panel.mode = EditMode::Saving(draft.clone());
            panel.error = None;
            (panel.post.clone(), draft, viewer)
        };

        let result = self.repo.update_post(&post, &draft, &viewer).await;
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!(post_id = %self.id, "Discarding save response for closed view");
            return result.map(|_| ());
        }

        let mut state = self.state.lock();
        if let DetailState::Ready(panel) = &mut *state {
            match &result {
                Ok(updated) => {
                    panel.post = updated.clone();
                    panel.mode = EditMode::Viewing;
                    panel.notice = Some("Blog updated successfully!".to_string());
                }
                Err(e) => {
                    panel.mode = EditMode::Editing(draft);
                    panel.error = Some(failure_message(e, "Failed to update blog. Please try again."));
                }
            }
        }
        result.map(|_| ())
    }

    /// Flip `published`; only while viewing. Returns the new value.
    pub async fn toggle_publish(&self) -> Result<bool, ContentError> {
        let (post, viewer) = self.begin_side_action()?;

        let result = self.repo.toggle_publish_post(&post, &viewer).await;
        if self.closed.load(Ordering::Acquire) {
            return result;
        }

        let mut state = self.state.lock();
        if let DetailState::Ready(panel) = &mut *state {
            panel.pending = false;
            match &result {
                Ok(published) => {
                    panel.post.published = *published;
                    panel.notice = Some(
                        if *published {
                            "Blog published!"
                        } else {
                            "Blog unpublished"
                        }
                        .to_string(),
                    );
                }
                Err(e) => {
                    panel.error = Some(failure_message(e, "Failed to update status. Please try again."));
                }
            }
        }
        result
    }

    /// Delete the post. Irreversible; confirmation is the caller's job.
    pub async fn delete(&self) -> Result<(), ContentError> {
        let (post, viewer) = self.begin_side_action()?;

        let result = self.repo.delete_post(&post, &viewer).await;
        if self.closed.load(Ordering::Acquire) {
            return result;
        }

        let mut state = self.state.lock();
        match &result {
            Ok(()) => *state = DetailState::Deleted,
            Err(ContentError::NotFound { .. }) => *state = DetailState::NotFound,
            Err(e) => {
                if let DetailState::Ready(panel) = &mut *state {
                    panel.pending = false;
                    panel.error = Some(failure_message(e, "Failed to delete blog. Please try again."));
                }
            }
        }
        result
    }

    /// Stop applying responses; in-flight calls still complete remotely.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn begin_side_action(&self) -> Result<(Post, Identity), ContentError> {
        let viewer = self.viewer();
        let mut state = self.state.lock();
        let panel = ready_panel(&mut state)?;

        if panel.pending {
            return Err(ContentError::Busy);
        }
        if panel.mode != EditMode::Viewing {
            return Err(ContentError::InvalidTransition("not available while editing"));
        }
        let Some(viewer) = viewer else {
            panel.error = Some(ContentError::Authorization.user_message().to_string());
            return Err(ContentError::Authorization);
        };

        panel.pending = true;
        panel.error = None;
        panel.notice = None;
        Ok((panel.post.clone(), viewer))
    }
}

fn ready_panel(state: &mut DetailState) -> Result<&mut PostPanel, ContentError> {
    match state {
        DetailState::Ready(panel) => Ok(panel),
        _ => Err(ContentError::InvalidTransition("post is not loaded")),
    }
}

fn failure_message(err: &ContentError, transport: &str) -> String {
    match err {
        ContentError::Transport(_) => transport.to_string(),
        other => other.user_message().to_string(),
    }
}
