use bitacora_core::report::{format_header_date, NoteReport};

use crate::commands::common::{
    normalize_note_identifier, open_database, resolve_note_for_edit, Session,
};
use crate::error::CliError;

pub async fn run_show(id: &str, session: &Session) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let db = open_database(session).await?;
    let note = resolve_note_for_edit(&normalized_id, &db).await?;

    println!("{}", format_header_date(note.date, session.offset()));
    println!("id: {}", note.id);
    println!();
    print!("{}", NoteReport::from_note(&note, session.offset()).render_text());

    if !note.image_urls.is_empty() {
        println!();
        println!("Imágenes:");
        for url in &note.image_urls {
            println!("  - {url}");
        }
    }

    Ok(())
}
