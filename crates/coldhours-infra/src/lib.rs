//! # ColdHours Infrastructure
//!
//! Concrete implementations of the ports defined in `coldhours-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL document store via SeaORM

pub mod bootstrap;
pub mod identity;
pub mod store;

// Re-exports
pub use bootstrap::{Backend, BackendConfig, BootstrapError};
pub use identity::{
    Argon2PasswordService, FederatedAuthorizer, JwtConfig, JwtSessionTokens, LocalIdentityProvider,
};
pub use store::{AccessRules, InMemoryDocumentStore};

#[cfg(feature = "postgres")]
pub use store::{DatabaseConfig, PostgresDocumentStore};
