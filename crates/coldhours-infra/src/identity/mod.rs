//! Identity provider implementations.

mod local;
mod password;
mod token;

use async_trait::async_trait;

use coldhours_core::domain::Identity;
use coldhours_core::ports::AuthError;

pub use local::LocalIdentityProvider;
pub use password::Argon2PasswordService;
pub use token::{JwtConfig, JwtSessionTokens, TokenError};

/// Third-party sign-in (the "continue with ..." button).
#[async_trait]
pub trait FederatedAuthorizer: Send + Sync {
    /// Provider name shown to the user.
    fn provider_name(&self) -> &str;

    /// Run the provider's consent flow and return the identity it vouches for.
    async fn authorize(&self) -> Result<Identity, AuthError>;
}
