//! # ColdHours Console
//!
//! Browse, write and publish posts from a terminal.

use tokio::io::{AsyncBufReadExt, BufReader};

use coldhours_core::{ContentRepository, IdentitySession, ProfileDirectory};
use coldhours_infra::bootstrap;

mod config;
mod session_file;
mod shell;
mod telemetry;

use config::AppConfig;
use session_file::SessionFile;
use shell::Console;
use telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let mut config = AppConfig::from_env();
    let session_file = config.session_file.clone().map(SessionFile::new);
    config.backend.session_token = session_file.as_ref().and_then(SessionFile::load);

    let backend = bootstrap::init(&config.backend).await?;
    tracing::info!("ColdHours console starting");

    let session = IdentitySession::new(backend.identity.clone());
    let _persistence = session_file.map(|file| file.track(&session, backend.provider().clone()));

    let mut console = Console::new(
        session,
        ContentRepository::new(backend.store.clone()),
        ProfileDirectory::new(backend.store.clone()),
        std::io::stdout(),
    );
    console.render()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !console.handle_line(&line).await? {
            break;
        }
    }

    tracing::info!("ColdHours console stopped");
    Ok(())
}
