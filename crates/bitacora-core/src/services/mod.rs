//! Backend services behind the journal intents.

mod database;

pub use database::DatabaseService;

use crate::models::{Note, NoteId};
use crate::Result;

/// Persistent note collection of the signed-in user.
///
/// Implementations own scoping: every note they return must belong to the
/// current user's collection.
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// Load every note of the collection
    async fn load_notes(&self) -> Result<Vec<Note>>;

    /// Insert a freshly created note
    async fn create_note(&self, note: &Note) -> Result<Note>;

    /// Persist an existing note
    async fn save_note(&self, note: &Note) -> Result<Note>;

    /// Remove a note
    async fn delete_note(&self, id: &NoteId) -> Result<()>;
}
