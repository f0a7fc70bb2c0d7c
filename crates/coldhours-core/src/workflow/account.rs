use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use parking_lot::Mutex;

use super::InFlight;
use crate::domain::{Identity, mask_email};
use crate::ports::{AuthError, IdentityClient};
use crate::profiles::ProfileDirectory;

const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up form as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl SignUpForm {
    /// Checks made before the provider is contacted.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.password != self.confirm {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Sign-in and sign-up screens.
///
/// Carries the path preserved by the route guard and hands it back on
/// success so the caller can navigate there.
pub struct AccountWorkflow {
    client: Arc<dyn IdentityClient>,
    profiles: ProfileDirectory,
    redirect_to: String,
    busy: AtomicBool,
    error: Mutex<Option<String>>,
}

impl AccountWorkflow {
    pub fn new(
        client: Arc<dyn IdentityClient>,
        profiles: ProfileDirectory,
        redirect_to: impl Into<String>,
    ) -> Self {
        Self {
            client,
            profiles,
            redirect_to: redirect_to.into(),
            busy: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let Some(_in_flight) = InFlight::begin(&self.busy) else {
            return Err(AuthError::InProgress);
        };
        *self.error.lock() = None;

        tracing::debug!(email = %mask_email(email), "Signing in with credentials");
        let result = self.client.sign_in_with_credentials(email, password).await;
        self.finish(result.map(|_| ()))
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<String, AuthError> {
        let Some(_in_flight) = InFlight::begin(&self.busy) else {
            return Err(AuthError::InProgress);
        };
        *self.error.lock() = None;

        if let Err(e) = form.validate() {
            return self.finish(Err(e));
        }

        tracing::debug!(email = %mask_email(&form.email), "Creating account");
        let result = match self
            .client
            .sign_up_with_credentials(form.name.trim(), &form.email, &form.password)
            .await
        {
            Ok(identity) => self.record_profile(&identity, &form.name).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    pub async fn sign_in_federated(&self) -> Result<String, AuthError> {
        let Some(_in_flight) = InFlight::begin(&self.busy) else {
            return Err(AuthError::InProgress);
        };
        *self.error.lock() = None;

        let result = match self.client.sign_in_with_federated_provider().await {
            Ok(identity) => self.record_profile(&identity, "").await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    async fn record_profile(&self, identity: &Identity, fallback_name: &str) -> Result<(), AuthError> {
        self.profiles
            .ensure_profile(identity, fallback_name)
            .await
            .map(|_| ())
            .map_err(|e| AuthError::Unknown(e.to_string()))
    }

    fn finish(&self, result: Result<(), AuthError>) -> Result<String, AuthError> {
        match result {
            Ok(()) => Ok(self.redirect_to.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Account action failed");
                *self.error.lock() = Some(e.user_message().to_string());
                Err(e)
            }
        }
    }
}
