//! Note editor bound to the shared journal state.
//!
//! The editor has no copy of the note: every field change is written straight
//! into the active note of the journal, and save/delete/upload are forwarded
//! to the journal intents. Its own state is the report toggle.

use chrono::FixedOffset;

use crate::journal::Journal;
use crate::models::{Note, NoteEdit, NoteId};
use crate::report::{format_header_date, NoteReport, ReportRenderer, ReportView};
use crate::services::NoteStore;
use crate::storage::{FileStorage, UploadFile};
use crate::{Error, Result};

pub struct NoteEditor<'a, S, F> {
    journal: &'a Journal<S, F>,
    report: ReportRenderer,
    offset: FixedOffset,
}

impl<'a, S, F> NoteEditor<'a, S, F>
where
    S: NoteStore,
    F: FileStorage + 'static,
{
    #[must_use]
    pub fn new(journal: &'a Journal<S, F>, offset: FixedOffset) -> Self {
        Self {
            journal,
            report: ReportRenderer::new(offset),
            offset,
        }
    }

    /// The note currently bound to the form.
    pub async fn note(&self) -> Result<Note> {
        self.journal.active_note().await.ok_or(Error::NoActiveNote)
    }

    pub async fn is_saving(&self) -> bool {
        self.journal.state().lock().await.is_saving
    }

    /// Write one field into the active note.
    pub async fn apply(&self, edit: NoteEdit) -> Result<()> {
        self.journal.edit_active_note(edit).await
    }

    pub async fn save(&self) -> Result<Note> {
        self.journal.save_active_note().await
    }

    /// Delete the active note. The caller picks what to show next.
    pub async fn delete(&self) -> Result<NoteId> {
        self.journal.delete_active_note().await
    }

    /// Upload a file selection; selecting nothing does nothing.
    pub async fn select_files(&self, files: Vec<UploadFile>) -> Result<Vec<String>> {
        self.journal.upload_files(files).await
    }

    pub fn toggle_report(&mut self) {
        self.report.toggle();
    }

    #[must_use]
    pub const fn report_view(&self) -> ReportView {
        self.report.view()
    }

    /// Report of the active note while the report view is shown.
    pub async fn report(&self) -> Result<Option<NoteReport>> {
        let note = self.note().await?;
        Ok(self.report.render(&note))
    }

    /// Header line above the form, e.g. `05 de marzo de 2024, 14:30`.
    pub async fn header_date(&self) -> Result<String> {
        let note = self.note().await?;
        Ok(format_header_date(note.date, &self.offset))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::journal::tests::{journal_with, RecordingStorage};
    use crate::models::MedicalArea;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn each_edit_changes_only_its_field() {
        let (journal, _rx) = journal_with(RecordingStorage::default()).await;
        journal.start_new_note().await.unwrap();
        let editor = NoteEditor::new(&journal, utc());
        let before = editor.note().await.unwrap();

        editor
            .apply(NoteEdit::Dni("30123456".to_string()))
            .await
            .unwrap();

        let after = editor.note().await.unwrap();
        assert_eq!(
            after,
            Note {
                dni: "30123456".to_string(),
                ..before.clone()
            }
        );

        editor
            .apply(NoteEdit::Area(Some(MedicalArea::Neurology)))
            .await
            .unwrap();
        let after = editor.note().await.unwrap();
        assert_eq!(after.area, Some(MedicalArea::Neurology));
        assert_eq!(after.title, before.title);
        assert_eq!(after.body, before.body);
        assert_eq!(after.date, before.date);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_notification_per_save() {
        let (journal, mut rx) = journal_with(RecordingStorage::default()).await;
        journal.start_new_note().await.unwrap();
        let editor = NoteEditor::new(&journal, utc());

        editor.save().await.unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        editor.save().await.unwrap();
        editor.save().await.unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_selection_makes_no_upload() {
        let (journal, _rx) = journal_with(RecordingStorage::default()).await;
        journal.start_new_note().await.unwrap();
        let editor = NoteEditor::new(&journal, utc());
        let before = journal.snapshot().await;

        let urls = editor.select_files(Vec::new()).await.unwrap();

        assert!(urls.is_empty());
        assert_eq!(journal.snapshot().await, before);
        assert_eq!(journal.storage().calls.load(Ordering::SeqCst), 0);

        editor
            .select_files(vec![UploadFile::new("rx.png", vec![1])])
            .await
            .unwrap();
        assert_eq!(journal.storage().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn report_toggle_and_header_date() {
        let (journal, _rx) = journal_with(RecordingStorage::default()).await;
        journal.start_new_note().await.unwrap();
        let mut editor = NoteEditor::new(&journal, utc());
        let march_fifth = Utc
            .with_ymd_and_hms(2024, 3, 5, 14, 30, 0)
            .unwrap()
            .timestamp_millis();
        editor.apply(NoteEdit::Date(march_fifth)).await.unwrap();

        assert_eq!(
            editor.header_date().await.unwrap(),
            "05 de marzo de 2024, 14:30"
        );
        assert!(editor.report().await.unwrap().is_none());

        editor.toggle_report();
        let report = editor.report().await.unwrap().unwrap();
        assert_eq!(report.date, "05 de marzo de 2024 - 14:30");

        editor.toggle_report();
        assert_eq!(editor.report_view(), ReportView::Hidden);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_clears_active_note() {
        let (journal, _rx) = journal_with(RecordingStorage::default()).await;
        journal.start_new_note().await.unwrap();
        let editor = NoteEditor::new(&journal, utc());

        editor.delete().await.unwrap();

        assert!(matches!(editor.note().await, Err(Error::NoActiveNote)));
        assert!(matches!(
            editor.apply(NoteEdit::Title("x".to_string())).await,
            Err(Error::NoActiveNote)
        ));
    }
}
