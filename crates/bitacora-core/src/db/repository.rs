//! Note repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use crate::error::{Error, Result};
use crate::models::{MedicalArea, Note, NoteId};
use libsql::{params, Connection, Value};

const NOTE_COLUMNS: &str =
    "id, title, body, date, area, dni, image_urls, created_at, updated_at, is_deleted";

/// Trait for note storage operations (async)
#[allow(async_fn_in_trait)]
pub trait NoteRepository {
    /// Insert a note record as given
    async fn create(&self, note: &Note) -> Result<Note>;

    /// Get a note by ID
    async fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// List notes (excluding deleted), most recent date first
    async fn list(&self) -> Result<Vec<Note>>;

    /// Overwrite every editable field of an existing note
    async fn update(&self, note: &Note) -> Result<Note>;

    /// Soft delete a note
    async fn delete(&self, id: &NoteId) -> Result<()>;

    /// Ids starting with `prefix`, for short-id lookups
    async fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;
}

/// libSQL implementation of `NoteRepository`, scoped to one owner's collection
pub struct LibSqlNoteRepository<'a> {
    conn: &'a Connection,
    owner: &'a str,
}

impl<'a> LibSqlNoteRepository<'a> {
    /// Create a repository over `owner`'s notes
    pub const fn new(conn: &'a Connection, owner: &'a str) -> Self {
        Self { conn, owner }
    }

    fn parse_note(row: &libsql::Row) -> Result<Note> {
        let id: String = row.get(0)?;
        let area = match row.get_value(4)? {
            Value::Text(label) if !label.trim().is_empty() => Some(label.parse::<MedicalArea>()?),
            _ => None,
        };
        let image_urls: String = row.get(6)?;

        Ok(Note {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("Invalid note id in database: {id}")))?,
            title: row.get(1)?,
            body: row.get(2)?,
            date: row.get(3)?,
            area,
            dni: row.get(5)?,
            image_urls: serde_json::from_str(&image_urls)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            is_deleted: row.get::<i32>(9)? != 0,
        })
    }

    fn area_value(note: &Note) -> Value {
        note.area
            .map_or(Value::Null, |area| Value::Text(area.label().to_string()))
    }
}

impl NoteRepository for LibSqlNoteRepository<'_> {
    async fn create(&self, note: &Note) -> Result<Note> {
        self.conn
            .execute(
                "INSERT INTO notes (id, owner, title, body, date, area, dni, image_urls, created_at, updated_at, is_deleted)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    note.id.as_str(),
                    self.owner,
                    note.title.as_str(),
                    note.body.as_str(),
                    note.date,
                    Self::area_value(note),
                    note.dni.as_str(),
                    serde_json::to_string(&note.image_urls)?,
                    note.created_at,
                    note.updated_at,
                    i32::from(note.is_deleted)
                ],
            )
            .await?;

        tracing::debug!("Created note {} for {}", note.id, self.owner);
        Ok(note.clone())
    }

    async fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND owner = ? AND is_deleted = 0"
                ),
                params![id.as_str(), self.owner],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE owner = ? AND is_deleted = 0
                     ORDER BY date DESC, id DESC"
                ),
                params![self.owner],
            )
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn update(&self, note: &Note) -> Result<Note> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE notes
                 SET title = ?, body = ?, date = ?, area = ?, dni = ?, image_urls = ?, updated_at = ?
                 WHERE id = ? AND owner = ? AND is_deleted = 0",
                params![
                    note.title.as_str(),
                    note.body.as_str(),
                    note.date,
                    Self::area_value(note),
                    note.dni.as_str(),
                    serde_json::to_string(&note.image_urls)?,
                    now,
                    note.id.as_str(),
                    self.owner
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(note.id.to_string()));
        }

        self.get(&note.id)
            .await?
            .ok_or_else(|| Error::NotFound(note.id.to_string()))
    }

    async fn delete(&self, id: &NoteId) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE notes SET is_deleted = 1, updated_at = ?
                 WHERE id = ? AND owner = ? AND is_deleted = 0",
                params![now, id.as_str(), self.owner],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM notes
                 WHERE owner = ? AND is_deleted = 0 AND id LIKE ?
                 ORDER BY id LIMIT ?",
                params![self.owner, format!("{prefix}%"), limit as i64],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::NoteEdit;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_note() -> Note {
        let mut note = Note::with_title("Visita");
        note.apply(NoteEdit::Body("Control de presión".to_string()));
        note.apply(NoteEdit::Area(Some(MedicalArea::Cardiology)));
        note.apply(NoteEdit::Dni("30.123.456".to_string()));
        note.image_urls = vec!["https://img.example.com/ecg.png".to_string()];
        note
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let note = sample_note();
        repo.create(&note).await.unwrap();

        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched, note);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_note_without_area_round_trips() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let note = Note::new();
        repo.create(&note).await.unwrap();
        let fetched = repo.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.area, None);
        assert!(fetched.image_urls.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_orders_by_date_desc() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let mut older = Note::with_title("older");
        older.date = 1_000;
        let mut newer = Note::with_title("newer");
        newer.date = 2_000;
        repo.create(&older).await.unwrap();
        repo.create(&newer).await.unwrap();

        let titles = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|note| note.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_collections_are_scoped_by_owner() {
        let db = setup().await;
        let ana = LibSqlNoteRepository::new(db.connection(), "ana");
        let beto = LibSqlNoteRepository::new(db.connection(), "beto");

        let note = sample_note();
        ana.create(&note).await.unwrap();

        assert!(beto.list().await.unwrap().is_empty());
        assert!(beto.get(&note.id).await.unwrap().is_none());
        assert!(beto.delete(&note.id).await.is_err());
        assert_eq!(ana.list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_overwrites_fields() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let note = sample_note();
        repo.create(&note).await.unwrap();

        let mut edited = note.clone();
        edited.apply(NoteEdit::Title("Seguimiento".to_string()));
        edited.apply(NoteEdit::Area(None));
        edited.image_urls.push("https://img.example.com/rx.png".to_string());

        let updated = repo.update(&edited).await.unwrap();
        assert_eq!(updated.title, "Seguimiento");
        assert_eq!(updated.area, None);
        assert_eq!(updated.image_urls.len(), 2);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_missing_note_is_not_found() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let result = repo.update(&Note::new()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let note = sample_note();
        repo.create(&note).await.unwrap();
        repo.delete(&note.id).await.unwrap();

        assert!(repo.get(&note.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.delete(&note.id).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_ids_by_prefix() {
        let db = setup().await;
        let repo = LibSqlNoteRepository::new(db.connection(), "ana");

        let note = sample_note();
        repo.create(&note).await.unwrap();

        let id = note.id.to_string();
        let ids = repo.list_ids_by_prefix(&id[..8], 3).await.unwrap();
        assert_eq!(ids, vec![id]);
        assert!(repo.list_ids_by_prefix("zzzz", 3).await.unwrap().is_empty());
    }
}
