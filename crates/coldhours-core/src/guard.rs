//! Route guard - gates protected views behind the identity session.

use crate::domain::Identity;
use crate::session::{IdentitySession, SessionState};

/// Sign-in entry point unauthenticated visitors are sent to.
pub const SIGN_IN_PATH: &str = "/login";

/// Redirect to the sign-in entry point, remembering where the visitor was going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    pub from: String,
}

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<V = Identity> {
    /// Identity not resolved yet; show a transitional placeholder.
    Placeholder,
    Redirect(Redirect),
    Render(V),
}

#[derive(Clone)]
pub struct RouteGuard {
    session: IdentitySession,
    sign_in_path: String,
}

impl RouteGuard {
    pub fn new(session: IdentitySession) -> Self {
        Self {
            session,
            sign_in_path: SIGN_IN_PATH.to_string(),
        }
    }

    pub fn session(&self) -> &IdentitySession {
        &self.session
    }

    /// Decide for `requested_path` against the current session state.
    pub fn check(&self, requested_path: &str) -> GuardDecision {
        self.mount(requested_path, |identity| identity)
    }

    /// Like [`RouteGuard::check`] but waits out the `Unknown` state first.
    pub async fn resolve(&self, requested_path: &str) -> GuardDecision {
        let state = self.session.resolved().await;
        self.decide(state, requested_path, |identity| identity)
    }

    /// Run `view` only when the session is authenticated.
    ///
    /// `view` is the protected view's entry point; it never runs while the
    /// identity is unknown or unauthenticated.
    pub fn mount<V>(&self, requested_path: &str, view: impl FnOnce(Identity) -> V) -> GuardDecision<V> {
        self.decide(self.session.current(), requested_path, view)
    }

    fn decide<V>(
        &self,
        state: SessionState,
        requested_path: &str,
        view: impl FnOnce(Identity) -> V,
    ) -> GuardDecision<V> {
        match state {
            SessionState::Unknown => GuardDecision::Placeholder,
            SessionState::Unauthenticated => {
                tracing::debug!(from = %requested_path, "Redirecting to sign-in");
                GuardDecision::Redirect(Redirect {
                    to: self.sign_in_path.clone(),
                    from: requested_path.to_string(),
                })
            }
            SessionState::Authenticated(identity) => GuardDecision::Render(view(identity)),
        }
    }
}
