//! Identity provider ports.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Identity;

/// Callback invoked with the provider's current identity on every change.
pub type IdentityListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Handle for removing a registered [`IdentityListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Identity provider connection.
///
/// Once the provider has resolved who is signed in, it calls every listener
/// with that state, including listeners added afterwards, and again on each
/// sign-in or sign-out.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    fn add_listener(&self, listener: IdentityListener) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_up_with_credentials(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_in_with_federated_provider(&self) -> Result<Identity, AuthError>;

    /// Change the display name held by the provider for the current identity.
    async fn update_display_name(&self, name: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailAlreadyInUse,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Weak password")]
    WeakPassword,

    #[error("Network request failed")]
    NetworkFailure,

    #[error("Sign-in method disabled")]
    SignInMethodDisabled,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Name is required")]
    MissingName,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("No identity is signed in")]
    NotSignedIn,

    #[error("A request is already in progress")]
    InProgress,

    #[error("Authentication failed: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Message shown to the person signing in.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::EmailAlreadyInUse => "Email already in use. Try logging in.",
            AuthError::InvalidEmail => "Invalid email address.",
            AuthError::WeakPassword => "Password too weak (min 6 chars).",
            AuthError::NetworkFailure => "Network error. Check internet.",
            AuthError::SignInMethodDisabled => "This sign-in method is disabled.",
            AuthError::InvalidCredentials => "Incorrect email or password.",
            AuthError::MissingName => "Please enter your name.",
            AuthError::PasswordMismatch => "Passwords do not match.",
            AuthError::NotSignedIn => "Please log in first.",
            AuthError::InProgress => "Please wait...",
            AuthError::Unknown(_) => "Authentication failed. Please try again.",
        }
    }
}
