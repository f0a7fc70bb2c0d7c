//! Account password hashing for the local identity provider.
//!
//! Accounts keep only the PHC string produced here; the plain password never
//! leaves the sign-up or sign-in call.

use std::fmt::Display;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use coldhours_core::ports::{AuthError, PasswordService};

/// Argon2id hashing with a fresh salt per account.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with explicit memory (KiB), iteration and lane costs.
    ///
    /// Tests use tiny costs so sign-up stays fast.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(hashing_failed)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(hashing_failed)
    }

    /// `Ok(false)` for a wrong password; `Err` only for a corrupt stored hash.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(stored).map_err(hashing_failed)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }
}

fn hashing_failed(err: impl Display) -> AuthError {
    tracing::error!(error = %err, "Password hashing failed");
    AuthError::Unknown(err.to_string())
}
