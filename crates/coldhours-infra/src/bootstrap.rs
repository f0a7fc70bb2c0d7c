//! One-time backend initialization.
//!
//! The identity provider and document store are created once per process;
//! every later [`init`] call hands back the same [`Backend`].

use std::sync::Arc;

use tokio::sync::OnceCell;

use coldhours_core::ports::{DocumentStore, IdentityClient};

use crate::identity::{Argon2PasswordService, JwtConfig, JwtSessionTokens, LocalIdentityProvider};
use crate::store::InMemoryDocumentStore;

#[cfg(feature = "postgres")]
use crate::store::{DatabaseConfig, PostgresDocumentStore, connect};

static BACKEND: OnceCell<Backend> = OnceCell::const_new();

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[cfg(feature = "postgres")]
    #[error("Database connection failed: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    /// Document database; the in-memory store is used when absent.
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Persisted session to restore.
    pub session_token: Option<String>,
}

/// Process-wide handles to the identity provider and document store.
pub struct Backend {
    pub identity: Arc<dyn IdentityClient>,
    pub store: Arc<dyn DocumentStore>,
    provider: Arc<LocalIdentityProvider>,
}

impl Backend {
    /// Build a backend without registering it process-wide.
    pub async fn build(config: &BackendConfig) -> Result<Self, BootstrapError> {
        let store = build_store(config).await?;

        let provider = Arc::new(LocalIdentityProvider::new(
            Arc::new(Argon2PasswordService::new()),
            JwtSessionTokens::new(config.jwt.clone()),
        ));
        provider.resolve(config.session_token.as_deref());

        Ok(Self {
            identity: provider.clone(),
            store,
            provider,
        })
    }

    pub fn provider(&self) -> &Arc<LocalIdentityProvider> {
        &self.provider
    }
}

#[cfg(feature = "postgres")]
async fn build_store(config: &BackendConfig) -> Result<Arc<dyn DocumentStore>, BootstrapError> {
    match &config.database {
        Some(database) => {
            let conn = connect(database).await?;
            Ok(Arc::new(PostgresDocumentStore::new(conn)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(_config: &BackendConfig) -> Result<Arc<dyn DocumentStore>, BootstrapError> {
    tracing::info!("Using in-memory document store");
    Ok(Arc::new(InMemoryDocumentStore::new()))
}

/// Initialize the process-wide backend. Only the first call's config is used.
pub async fn init(config: &BackendConfig) -> Result<&'static Backend, BootstrapError> {
    BACKEND
        .get_or_try_init(|| async {
            tracing::info!("Initializing backend");
            Backend::build(config).await
        })
        .await
}

/// The backend, if [`init`] has completed.
pub fn get() -> Option<&'static Backend> {
    BACKEND.get()
}
