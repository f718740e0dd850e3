//! Async journal intents.
//!
//! Each intent calls the note store or the file storage and then applies the
//! matching [`JournalState`] mutation. The state lock is only taken around
//! those mutations, never across a backend call, so overlapping intents land
//! in completion order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::models::{Note, NoteEdit, NoteId};
use crate::services::NoteStore;
use crate::state::{JournalState, SharedJournal};
use crate::storage::{FileStorage, UploadFile};
use crate::{Error, Result};

/// Events for the front end, one per completed intent that reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A save completed; `message` is the acknowledgment text
    Saved { id: NoteId, message: String },
}

/// Receiving half of the notification channel.
pub type Notifications = mpsc::UnboundedReceiver<Notification>;

/// Intent dispatcher bound to one shared state, store, and file storage.
pub struct Journal<S, F> {
    state: SharedJournal,
    store: Arc<S>,
    storage: Arc<F>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<S, F> Journal<S, F>
where
    S: NoteStore,
    F: FileStorage + 'static,
{
    pub fn new(store: S, storage: F) -> (Self, Notifications) {
        Self::with_state(JournalState::shared(), store, storage)
    }

    /// Bind to an existing shared state, e.g. one a search list also reads.
    pub fn with_state(state: SharedJournal, store: S, storage: F) -> (Self, Notifications) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let journal = Self {
            state,
            store: Arc::new(store),
            storage: Arc::new(storage),
            notifications: sender,
        };
        (journal, receiver)
    }

    #[must_use]
    pub fn state(&self) -> &SharedJournal {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn storage(&self) -> &F {
        &self.storage
    }

    pub async fn snapshot(&self) -> JournalState {
        self.state.lock().await.clone()
    }

    pub async fn active_note(&self) -> Option<Note> {
        self.state.lock().await.active.clone()
    }

    /// Replace the note list with the store's collection.
    pub async fn load_notes(&self) -> Result<usize> {
        let notes = self.store.load_notes().await?;
        let count = notes.len();
        self.state.lock().await.set_notes(notes);
        tracing::debug!("Loaded {} notes", count);
        Ok(count)
    }

    /// Create an empty note in the store and make it the active note.
    pub async fn start_new_note(&self) -> Result<Note> {
        self.state.lock().await.set_saving();

        let created = match self.store.create_note(&Note::new()).await {
            Ok(note) => note,
            Err(error) => {
                self.state.lock().await.finish_failed_operation();
                return Err(error);
            }
        };

        let mut state = self.state.lock().await;
        state.add_new_empty_note(created.clone());
        state.set_active_note(created.clone());
        tracing::info!("Created note {}", created.id);
        Ok(created)
    }

    /// Bind the listed note with `id` to the editor.
    pub async fn set_active_note(&self, id: &NoteId) -> Result<Note> {
        let mut state = self.state.lock().await;
        let note = state
            .find(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        state.set_active_note(note.clone());
        Ok(note)
    }

    /// Apply one field edit to the active note.
    pub async fn edit_active_note(&self, edit: NoteEdit) -> Result<()> {
        let mut state = self.state.lock().await;
        let active = state.active.as_mut().ok_or(Error::NoActiveNote)?;
        active.apply(edit);
        Ok(())
    }

    /// Persist the active note and emit one [`Notification::Saved`].
    pub async fn save_active_note(&self) -> Result<Note> {
        let note = {
            let mut state = self.state.lock().await;
            let note = state.active.clone().ok_or(Error::NoActiveNote)?;
            state.set_saving();
            note
        };

        let saved = match self.store.save_note(&note).await {
            Ok(saved) => saved,
            Err(error) => {
                self.state.lock().await.finish_failed_operation();
                return Err(error);
            }
        };

        let message = self.state.lock().await.update_note(saved.clone());
        tracing::info!("Saved note {}", saved.id);
        // A dropped receiver only means nobody is listening.
        let _ = self.notifications.send(Notification::Saved {
            id: saved.id,
            message,
        });
        Ok(saved)
    }

    /// Remove the active note from the store and from the list.
    pub async fn delete_active_note(&self) -> Result<NoteId> {
        let id = self
            .state
            .lock()
            .await
            .active
            .as_ref()
            .map(|note| note.id)
            .ok_or(Error::NoActiveNote)?;

        self.store.delete_note(&id).await?;
        self.state.lock().await.delete_note_by_id(&id);
        tracing::info!("Deleted note {}", id);
        Ok(id)
    }

    /// Upload `files` concurrently and append their URLs to the active note
    /// in completion order.
    ///
    /// An empty selection returns immediately without touching the state.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let note_id = {
            let mut state = self.state.lock().await;
            let id = state
                .active
                .as_ref()
                .map(|note| note.id)
                .ok_or(Error::NoActiveNote)?;
            state.set_saving();
            id
        };

        let urls = match self.upload_all(note_id, files).await {
            Ok(urls) => urls,
            Err(error) => {
                self.state.lock().await.finish_failed_operation();
                return Err(error);
            }
        };

        self.state
            .lock()
            .await
            .set_photos_to_active_note(urls.clone());
        tracing::info!("Attached {} file(s) to note {}", urls.len(), note_id);
        Ok(urls)
    }

    async fn upload_all(&self, note_id: NoteId, files: Vec<UploadFile>) -> Result<Vec<String>> {
        let mut uploads = JoinSet::new();
        for file in files {
            let storage = Arc::clone(&self.storage);
            uploads.spawn(async move { storage.upload(note_id, file).await });
        }

        let mut urls = Vec::with_capacity(uploads.len());
        while let Some(joined) = uploads.join_next().await {
            let url = joined.map_err(|error| Error::Upload(error.to_string()))??;
            urls.push(url);
        }
        Ok(urls)
    }

    /// Forget every note, as on sign-out.
    pub async fn clear(&self) {
        self.state.lock().await.clear();
    }
}
