use bitacora_core::search::SearchableList;

use crate::commands::common::{
    format_note_lines, normalize_search_query, note_to_list_item, open_database, NoteListItem,
    Session,
};
use crate::error::CliError;

pub async fn run_list(
    query: Option<&str>,
    as_json: bool,
    session: &Session,
) -> Result<(), CliError> {
    let db = open_database(session).await?;
    let notes = db.list_notes().await?;

    let mut list = SearchableList::new();
    if let Some(query) = query {
        list.set_query(query);
    }
    let visible = list.visible(&notes);

    if as_json {
        let json_items = visible
            .into_iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(visible) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_search(query: &str, as_json: bool, session: &Session) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    run_list(Some(&normalized_query), as_json, session).await
}
