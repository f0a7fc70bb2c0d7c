//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use coldhours_infra::{BackendConfig, JwtConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Where the signed-in session is kept between runs.
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut backend = BackendConfig {
            jwt: JwtConfig::from_env(),
            ..BackendConfig::default()
        };

        #[cfg(feature = "postgres")]
        {
            backend.database = env::var("DATABASE_URL")
                .ok()
                .map(|url| coldhours_infra::DatabaseConfig {
                    url,
                    max_connections: env::var("DB_MAX_CONNECTIONS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(20),
                    min_connections: env::var("DB_MIN_CONNECTIONS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(2),
                });
        }

        Self {
            backend,
            session_file: env::var("SESSION_FILE").ok().map(PathBuf::from),
        }
    }
}
