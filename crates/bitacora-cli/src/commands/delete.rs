use bitacora_core::editor::NoteEditor;

use crate::commands::common::{activate_note, open_journal, Session};
use crate::error::CliError;

pub async fn run_delete(id: &str, session: &Session) -> Result<(), CliError> {
    let (journal, _notifications) = open_journal(session).await?;
    activate_note(&journal, id).await?;

    let deleted = NoteEditor::new(&journal, *session.offset()).delete().await?;
    println!("{deleted}");
    Ok(())
}
