use bitacora_core::editor::NoteEditor;
use bitacora_core::journal::Notification;
use bitacora_core::models::NoteEdit;

use crate::cli::FieldArgs;
use crate::commands::common::{
    activate_note, capture_editor_input_with_initial, field_edits, open_journal, Session,
};
use crate::error::CliError;

pub async fn run_edit(id: &str, fields: &FieldArgs, session: &Session) -> Result<(), CliError> {
    let mut edits = field_edits(fields, session.offset())?;

    let (journal, mut notifications) = open_journal(session).await?;
    let note = activate_note(&journal, id).await?;

    if fields.is_empty() {
        let body = capture_editor_input_with_initial(&note.body)?;
        if body == note.body {
            println!("{}", note.id);
            return Ok(());
        }
        edits.push(NoteEdit::Body(body));
    }

    let editor = NoteEditor::new(&journal, *session.offset());
    for edit in edits {
        editor.apply(edit).await?;
    }
    editor.save().await?;

    if let Ok(Notification::Saved { message, .. }) = notifications.try_recv() {
        eprintln!("{message}");
    }
    println!("{}", note.id);
    Ok(())
}
