use crate::commands::common::{open_database, Session};
use crate::error::CliError;

pub async fn run_sync(session: &Session) -> Result<(), CliError> {
    if session.config.sync.is_none() {
        return Err(CliError::SyncNotConfigured);
    }

    let db = open_database(session).await?;
    if !db.is_sync_enabled().await {
        return Err(CliError::SyncNotConfigured);
    }

    db.sync().await?;
    println!("Sync completed");
    Ok(())
}
