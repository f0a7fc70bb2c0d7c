//! Keeps the provider session token on disk between runs.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use coldhours_core::{IdentitySession, SessionState, Subscription};
use coldhours_infra::LocalIdentityProvider;

#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The stored token, if any.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Some(token.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read session file");
                None
            }
        }
    }

    /// Rewrite the file on every sign-in and remove it on sign-out.
    pub fn track(
        self,
        session: &IdentitySession,
        provider: Arc<LocalIdentityProvider>,
    ) -> Subscription {
        session.subscribe(move |state| {
            let result = match state {
                SessionState::Authenticated(_) => match provider.session_token() {
                    Ok(Some(token)) => fs::write(&self.path, token),
                    Ok(None) => Ok(()),
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not issue session token");
                        Ok(())
                    }
                },
                SessionState::Unauthenticated => match fs::remove_file(&self.path) {
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    other => other,
                },
                SessionState::Unknown => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not update session file");
            }
        })
    }
}
