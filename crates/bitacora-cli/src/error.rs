use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] bitacora_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    InvalidDate(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error(
        "Sync is not configured. Set TURSO_DATABASE_URL and TURSO_AUTH_TOKEN to enable `bitacora sync`."
    )]
    SyncNotConfigured,
}
