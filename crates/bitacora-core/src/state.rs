//! Shared journal state container.
//!
//! Every front end component reads and writes one `JournalState` through a
//! [`SharedJournal`] handle. The mutations below are synchronous; the async
//! intents in [`crate::journal`] call them once the store has answered.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{Note, NoteId};

/// Handle to the journal state shared between components.
pub type SharedJournal = Arc<Mutex<JournalState>>;

/// The journal as seen by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalState {
    /// Notes of the current user's collection
    pub notes: Vec<Note>,
    /// Note bound to the editor
    pub active: Option<Note>,
    /// Whether a save or upload is in flight
    pub is_saving: bool,
    /// Acknowledgment of the last completed save
    pub message_saved: Option<String>,
}

impl JournalState {
    /// Empty state wrapped for sharing
    #[must_use]
    pub fn shared() -> SharedJournal {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn set_saving(&mut self) {
        self.is_saving = true;
        self.message_saved = None;
    }

    pub fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub fn add_new_empty_note(&mut self, note: Note) {
        self.notes.push(note);
        self.is_saving = false;
    }

    /// Replace the active note wholesale
    pub fn set_active_note(&mut self, note: Note) {
        self.active = Some(note);
        self.message_saved = None;
    }

    /// Record a completed save and return the acknowledgment text
    pub fn update_note(&mut self, note: Note) -> String {
        let message = format!("{}, actualizada correctamente", note.title);
        if let Some(existing) = self.notes.iter_mut().find(|n| n.id == note.id) {
            *existing = note;
        } else {
            self.notes.push(note);
        }
        self.is_saving = false;
        self.message_saved = Some(message.clone());
        message
    }

    /// Append uploaded image URLs to the active note
    pub fn set_photos_to_active_note(&mut self, urls: Vec<String>) {
        if let Some(active) = self.active.as_mut() {
            active.image_urls.extend(urls);
        }
        self.is_saving = false;
    }

    pub fn delete_note_by_id(&mut self, id: &NoteId) {
        self.active = None;
        self.notes.retain(|note| note.id != *id);
    }

    /// Reset everything, as on logout
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn finish_failed_operation(&mut self) {
        self.is_saving = false;
    }

    #[must_use]
    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == *id)
    }
}
