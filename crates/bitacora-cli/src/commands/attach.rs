use std::path::PathBuf;

use bitacora_core::editor::NoteEditor;
use bitacora_core::storage::UploadFile;

use crate::commands::common::{activate_note, open_journal, Session};
use crate::error::CliError;

pub async fn run_attach(id: &str, files: &[PathBuf], session: &Session) -> Result<(), CliError> {
    let mut selection = Vec::with_capacity(files.len());
    for path in files {
        selection.push(UploadFile::from_path(path).await?);
    }

    let (journal, _notifications) = open_journal(session).await?;
    activate_note(&journal, id).await?;
    let editor = NoteEditor::new(&journal, *session.offset());

    let urls = editor.select_files(selection).await?;
    if urls.is_empty() {
        return Ok(());
    }

    // Uploads only touch the active note; persist the new URLs.
    editor.save().await?;
    for url in urls {
        println!("{url}");
    }
    Ok(())
}
