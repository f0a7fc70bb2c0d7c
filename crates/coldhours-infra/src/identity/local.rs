//! Process-local identity provider.
//!
//! Holds e-mail/password accounts in memory, persists a sign-in as a JWT
//! session token, and optionally delegates "continue with ..." sign-in to a
//! [`FederatedAuthorizer`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use coldhours_core::domain::{Identity, IdentityId, mask_email};
use coldhours_core::ports::{
    AuthError, IdentityClient, IdentityListener, ListenerId, PasswordService,
};

use super::FederatedAuthorizer;
use super::token::JwtSessionTokens;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    identity: Identity,
    password_hash: String,
}

#[derive(Clone)]
enum Resolution {
    Pending,
    Resolved(Option<Identity>),
}

pub struct LocalIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    listeners: Mutex<BTreeMap<ListenerId, IdentityListener>>,
    next_listener: AtomicU64,
    current: Mutex<Resolution>,
    passwords: Arc<dyn PasswordService>,
    tokens: JwtSessionTokens,
    federated: Option<Arc<dyn FederatedAuthorizer>>,
    credentials_enabled: bool,
    online: AtomicBool,
}

impl LocalIdentityProvider {
    pub fn new(passwords: Arc<dyn PasswordService>, tokens: JwtSessionTokens) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            listeners: Mutex::new(BTreeMap::new()),
            next_listener: AtomicU64::new(1),
            current: Mutex::new(Resolution::Pending),
            passwords,
            tokens,
            federated: None,
            credentials_enabled: true,
            online: AtomicBool::new(true),
        }
    }

    pub fn with_federated(mut self, authorizer: Arc<dyn FederatedAuthorizer>) -> Self {
        self.federated = Some(authorizer);
        self
    }

    /// Reject e-mail/password sign-in and sign-up.
    pub fn without_credentials(mut self) -> Self {
        self.credentials_enabled = false;
        self
    }

    /// Simulate losing (or regaining) the connection to the provider.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.current.lock(), Resolution::Resolved(_))
    }

    /// Settle the initial session, restoring it from a persisted token when
    /// one is given. Later calls are ignored.
    pub fn resolve(&self, token: Option<&str>) {
        if self.is_resolved() {
            tracing::debug!("Identity provider already resolved");
            return;
        }

        let restored = token.and_then(|token| match self.tokens.verify(token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding persisted session");
                None
            }
        });

        if let Some(identity) = &restored {
            tracing::info!(identity_id = %identity.id, "Session restored");
        }
        self.transition(restored);
    }

    /// Token that restores the current sign-in, if anyone is signed in.
    pub fn session_token(&self) -> Result<Option<String>, AuthError> {
        match self.current_identity() {
            Some(identity) => Ok(Some(self.tokens.issue(&identity)?)),
            None => Ok(None),
        }
    }

    fn current_identity(&self) -> Option<Identity> {
        match &*self.current.lock() {
            Resolution::Resolved(identity) => identity.clone(),
            Resolution::Pending => None,
        }
    }

    /// Record the new state and notify listeners in registration order.
    fn transition(&self, identity: Option<Identity>) {
        *self.current.lock() = Resolution::Resolved(identity.clone());

        // Listeners may call back into the provider.
        let listeners: Vec<IdentityListener> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(identity.clone());
        }
    }

    fn ensure_reachable(&self) -> Result<(), AuthError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::NetworkFailure)
        }
    }

    fn ensure_credentials_enabled(&self) -> Result<(), AuthError> {
        if self.credentials_enabled {
            Ok(())
        } else {
            Err(AuthError::SignInMethodDisabled)
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[async_trait]
impl IdentityClient for LocalIdentityProvider {
    fn add_listener(&self, listener: IdentityListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().insert(id, listener.clone());

        let resolution = self.current.lock().clone();
        if let Resolution::Resolved(identity) = resolution {
            listener(identity);
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }

    async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.ensure_reachable()?;
        self.ensure_credentials_enabled()?;

        let key = email.trim().to_lowercase();
        let found = self
            .accounts
            .lock()
            .get(&key)
            .map(|account| (account.identity.clone(), account.password_hash.clone()));

        let Some((identity, password_hash)) = found else {
            tracing::debug!(email = %mask_email(&key), "Sign-in for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &password_hash)? {
            tracing::debug!(email = %mask_email(&key), "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(identity_id = %identity.id, "Signed in");
        self.transition(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up_with_credentials(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.ensure_reachable()?;
        self.ensure_credentials_enabled()?;

        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let key = email.to_lowercase();
        if self.accounts.lock().contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password_hash = self.passwords.hash(password)?;

        let mut identity = Identity::new(Uuid::new_v4().simple().to_string()).with_email(email);
        let name = name.trim();
        if !name.is_empty() {
            identity = identity.with_display_name(name);
        }

        {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            accounts.insert(
                key.clone(),
                Account {
                    identity: identity.clone(),
                    password_hash,
                },
            );
        }

        tracing::info!(identity_id = %identity.id, email = %mask_email(&key), "Account created");
        self.transition(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_federated_provider(&self) -> Result<Identity, AuthError> {
        self.ensure_reachable()?;
        let Some(authorizer) = self.federated.clone() else {
            return Err(AuthError::SignInMethodDisabled);
        };

        let identity = authorizer.authorize().await?;

        tracing::info!(
            identity_id = %identity.id,
            provider = authorizer.provider_name(),
            "Signed in with federated provider"
        );
        self.transition(Some(identity.clone()));
        Ok(identity)
    }

    async fn update_display_name(&self, name: &str) -> Result<Identity, AuthError> {
        self.ensure_reachable()?;
        let Some(current) = self.current_identity() else {
            return Err(AuthError::NotSignedIn);
        };

        let updated = current.with_display_name(name.trim());
        let id: &IdentityId = &updated.id;
        for account in self.accounts.lock().values_mut() {
            if &account.identity.id == id {
                account.identity = updated.clone();
            }
        }

        self.transition(Some(updated.clone()));
        Ok(updated)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(identity) = self.current_identity() {
            tracing::info!(identity_id = %identity.id, "Signed out");
        }
        self.transition(None);
        Ok(())
    }
}
