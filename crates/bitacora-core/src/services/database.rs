//! Shared database service wrapper used by the front ends.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::NoteStore;
use crate::db::{Database, DatabaseLocation, LibSqlNoteRepository, NoteRepository, SyncConfig};
use crate::models::{Note, NoteId};
use crate::Result;

/// Thread-safe service for one user's note collection.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    owner: Arc<str>,
}

impl DatabaseService {
    /// Open the journal file at `db_path`, as a replica when `sync_config`
    /// is given.
    pub async fn open_path(
        db_path: impl Into<PathBuf>,
        sync_config: Option<SyncConfig>,
        owner: &str,
    ) -> Result<Self> {
        let location = DatabaseLocation::for_path(db_path, sync_config);
        let db = Database::open(&location).await?;
        Ok(Self::from_database(db, owner))
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory(owner: &str) -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db, owner))
    }

    fn from_database(db: Database, owner: &str) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            owner: Arc::from(owner),
        }
    }

    /// Owner id of the collection this service reads and writes.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Sync with remote DB when sync is enabled.
    pub async fn sync(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.sync().await
    }

    pub async fn is_sync_enabled(&self) -> bool {
        let db = self.db.lock().await;
        db.is_replica()
    }

    /// List notes, most recent date first.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.list().await
    }

    /// Fetch a note by id.
    pub async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.get(id).await
    }

    /// Insert a new note record.
    pub async fn create_note(&self, note: &Note) -> Result<Note> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.create(note).await
    }

    /// Persist every editable field of a note.
    pub async fn update_note(&self, note: &Note) -> Result<Note> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.update(note).await
    }

    /// Soft-delete a note.
    pub async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.delete(id).await
    }

    /// Full ids matching a short id prefix.
    pub async fn list_note_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let repo = LibSqlNoteRepository::new(db.connection(), &self.owner);
        repo.list_ids_by_prefix(prefix, limit).await
    }
}

impl NoteStore for DatabaseService {
    async fn load_notes(&self) -> Result<Vec<Note>> {
        self.list_notes().await
    }

    async fn create_note(&self, note: &Note) -> Result<Note> {
        Self::create_note(self, note).await
    }

    async fn save_note(&self, note: &Note) -> Result<Note> {
        self.update_note(note).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        Self::delete_note(self, id).await
    }
}
