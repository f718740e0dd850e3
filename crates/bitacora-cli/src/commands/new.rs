use bitacora_core::editor::NoteEditor;

use crate::cli::FieldArgs;
use crate::commands::common::{field_edits, open_journal, Session};
use crate::error::CliError;

pub async fn run_new(fields: &FieldArgs, session: &Session) -> Result<(), CliError> {
    let edits = field_edits(fields, session.offset())?;

    let (journal, _notifications) = open_journal(session).await?;
    let note = journal.start_new_note().await?;

    if !edits.is_empty() {
        let editor = NoteEditor::new(&journal, *session.offset());
        for edit in edits {
            editor.apply(edit).await?;
        }
        editor.save().await?;
    }

    println!("{}", note.id);
    Ok(())
}
