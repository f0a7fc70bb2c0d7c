//! Identity session - the single, subscribable view of who is signed in.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::Identity;
use crate::ports::{AuthError, IdentityClient, IdentityListener, ListenerId};

/// Identity state as observed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Before the provider's first callback. Never re-entered.
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionState {
    fn from_provider(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => SessionState::Authenticated(identity),
            None => SessionState::Unauthenticated,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SessionState::Unknown)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Wraps an [`IdentityClient`] and mirrors its state.
///
/// Cheap to clone; all clones share the same mirror. The mirror's provider
/// listener is released when the last clone is dropped.
#[derive(Clone)]
pub struct IdentitySession {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn IdentityClient>,
    state: Arc<watch::Sender<SessionState>>,
    mirror: ListenerId,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.client.remove_listener(self.mirror);
    }
}

impl IdentitySession {
    pub fn new(client: Arc<dyn IdentityClient>) -> Self {
        let (tx, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(tx);

        let mirror_state = Arc::clone(&state);
        let mirror = client.add_listener(Arc::new(move |identity: Option<Identity>| {
            let next = SessionState::from_provider(identity);
            mirror_state.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                match &next {
                    SessionState::Authenticated(identity) => {
                        tracing::info!(identity_id = %identity.id, "Identity authenticated");
                    }
                    _ => tracing::info!("Identity signed out"),
                }
                *current = next;
                true
            });
        }));

        Self {
            inner: Arc::new(Inner {
                client,
                state,
                mirror,
            }),
        }
    }

    /// The provider this session wraps.
    pub fn client(&self) -> &Arc<dyn IdentityClient> {
        &self.inner.client
    }

    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().identity().cloned()
    }

    /// Wait for the provider's first callback and return the resolved state.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|state| !state.is_unknown()).await {
            Ok(state) => state.clone(),
            Err(_) => self.current(),
        }
    }

    /// Register `handler` for every identity-state transition.
    ///
    /// The handler is called at once with the current state, then on each
    /// change, in provider order. Keep the returned [`Subscription`] for as
    /// long as the handler should run.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let initial = self.current();
        handler(&initial);

        let last = Mutex::new(initial);
        let listener: IdentityListener = Arc::new(move |identity: Option<Identity>| {
            let next = SessionState::from_provider(identity);
            {
                let mut last = last.lock();
                if *last == next {
                    return;
                }
                *last = next.clone();
            }
            handler(&next);
        });

        let id = self.inner.client.add_listener(listener);
        tracing::debug!(listener = id.0, "Session subscription registered");

        Subscription {
            client: Arc::clone(&self.inner.client),
            id: Some(id),
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.inner.client.sign_out().await
    }
}

/// Unsubscribe token returned by [`IdentitySession::subscribe`].
///
/// Releases the provider listener on [`Subscription::unsubscribe`] or drop.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    client: Arc<dyn IdentityClient>,
    id: Option<ListenerId>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.client.remove_listener(id);
            tracing::debug!(listener = id.0, "Session subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
