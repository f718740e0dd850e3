//! Opening the journal database.
//!
//! A journal lives in memory (tests), in a local file, or in a local file
//! that is an embedded replica of a remote Turso database. Every open runs
//! the migrations before the handle is returned.

use std::path::{Path, PathBuf};
use std::time::Duration;

use libsql::{Builder, Connection, Database as LibSqlDatabase};

use super::migrations;
use crate::error::{Error, Result};

/// How often an embedded replica pulls from the remote on its own.
pub const AUTO_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Remote database credentials for an embedded replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Remote database URL (e.g., `libsql://journal.turso.io`)
    pub url: String,
    pub auth_token: String,
}

impl SyncConfig {
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: auth_token.into(),
        }
    }
}

/// Where a journal database is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
    Replica { path: PathBuf, sync: SyncConfig },
}

impl DatabaseLocation {
    /// A file at `path`, replicated from the remote when `sync` is given.
    pub fn for_path(path: impl Into<PathBuf>, sync: Option<SyncConfig>) -> Self {
        let path = path.into();
        match sync {
            Some(sync) => Self::Replica { path, sync },
            None => Self::File(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory => None,
            Self::File(path) | Self::Replica { path, .. } => Some(path),
        }
    }
}

/// Migrated libSQL handle for one journal.
pub struct Database {
    db: LibSqlDatabase,
    conn: Connection,
    replica: bool,
}

impl Database {
    /// Open (creating when missing) the journal at `location`.
    ///
    /// A replica whose local files are unreadable is moved aside and pulled
    /// again from the remote, once.
    pub async fn open(location: &DatabaseLocation) -> Result<Self> {
        if let Some(parent) = location.path().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match location {
            DatabaseLocation::Memory => Self::open_local(":memory:").await,
            DatabaseLocation::File(path) => {
                tracing::info!("Opening local journal at {}", path.display());
                Self::open_local(&path.to_string_lossy()).await
            }
            DatabaseLocation::Replica { path, sync } => {
                tracing::info!("Opening journal replica of {} at {}", sync.url, path.display());
                match Self::open_replica(path, sync).await {
                    Err(error) if is_recoverable_replica_error(&error) => {
                        tracing::warn!(
                            "Local replica at {} is unusable ({}); pulling a fresh copy",
                            path.display(),
                            error
                        );
                        quarantine_replica_files(path)?;
                        Self::open_replica(path, sync).await
                    }
                    opened => opened,
                }
            }
        }
    }

    pub async fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseLocation::Memory).await
    }

    async fn open_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Self {
            db,
            conn,
            replica: false,
        }
        .prepare()
        .await
    }

    async fn open_replica(path: &Path, sync: &SyncConfig) -> Result<Self> {
        let db = Builder::new_remote_replica(
            path.to_string_lossy().to_string(),
            sync.url.clone(),
            sync.auth_token.clone(),
        )
        .sync_interval(AUTO_SYNC_INTERVAL)
        .build()
        .await?;
        let conn = db.connect()?;
        let database = Self {
            db,
            conn,
            replica: true,
        };

        // The remote may already carry the schema.
        database.sync().await?;
        database.prepare().await
    }

    async fn prepare(self) -> Result<Self> {
        // Replicas reject local pragmas; they are a tuning, not a requirement.
        self.conn.execute("PRAGMA journal_mode = WAL;", ()).await.ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        migrations::run(&self.conn).await?;
        Ok(self)
    }

    /// Pull remote changes into a replica; a no-op for local journals.
    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db.sync().await?;
            tracing::debug!("Journal replica synced");
        }
        Ok(())
    }

    pub const fn is_replica(&self) -> bool {
        self.replica
    }

    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn is_recoverable_replica_error(error: &Error) -> bool {
    let message = error.to_string().to_ascii_lowercase();
    message.contains("file is not a database")
        || message.contains("invalid local state")
        || message.contains("metadata file exists but db file does not")
}

/// Rename the replica file to `<name>.corrupt-<ms>` and remove its
/// `<name>-*` sidecars.
fn quarantine_replica_files(db_path: &Path) -> Result<()> {
    let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
        return Ok(());
    };

    if db_path.exists() {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));
        std::fs::rename(db_path, &backup_path)?;
        tracing::warn!("Moved unusable replica to {}", backup_path.display());
    }

    let parent = match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let sidecar_prefix = format!("{base_name}-");

    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.file_name().to_string_lossy().starts_with(&sidecar_prefix)
        {
            let path = entry.path();
            std::fs::remove_file(&path)?;
            tracing::warn!("Removed stale replica file {}", path.display());
        }
    }

    Ok(())
}
