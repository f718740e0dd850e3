//! Sidebar search over note titles.
//!
//! Matching is a plain case-insensitive substring test against the title.
//! There is no tokenizing, ranking, or fuzzy matching, and the relative order
//! of the input is always preserved.

use crate::models::Note;
use crate::state::SharedJournal;

/// Return the notes whose title contains `query`, ignoring case.
///
/// An empty query returns every note.
#[must_use]
pub fn filter_notes_by_title<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let query = query.to_lowercase();
    notes
        .iter()
        .filter(|note| title_matches(note, &query))
        .collect()
}

fn title_matches(note: &Note, lowered_query: &str) -> bool {
    lowered_query.is_empty() || note.title.to_lowercase().contains(lowered_query)
}

/// Searchable note list. The query string is its only state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchableList {
    query: String,
}

impl SearchableList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            query: String::new(),
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filter an explicit note slice with the current query.
    #[must_use]
    pub fn visible<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        filter_notes_by_title(notes, &self.query)
    }

    /// Snapshot the notes of the shared journal that match the current query.
    pub async fn visible_from(&self, journal: &SharedJournal) -> Vec<Note> {
        let state = journal.lock().await;
        self.visible(&state.notes).into_iter().cloned().collect()
    }
}
