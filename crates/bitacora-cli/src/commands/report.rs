use std::path::{Path, PathBuf};

use bitacora_core::report::{suggested_report_file_name, NoteReport};

use crate::cli::ReportFormat;
use crate::commands::common::{
    normalize_note_identifier, open_database, resolve_note_for_edit, Session,
};
use crate::error::CliError;

pub async fn run_report(
    id: &str,
    format: ReportFormat,
    output_path: Option<&Path>,
    session: &Session,
) -> Result<(), CliError> {
    let normalized_id = normalize_note_identifier(id)?;
    let db = open_database(session).await?;
    let note = resolve_note_for_edit(&normalized_id, &db).await?;
    let report = NoteReport::from_note(&note, session.offset());

    match format {
        ReportFormat::Text => {
            let rendered = report.render_text();
            if let Some(path) = output_path {
                std::fs::write(path, rendered)?;
                println!("{}", path.display());
            } else {
                print!("{rendered}");
            }
        }
        ReportFormat::Pdf => {
            let path = output_path.map_or_else(
                || PathBuf::from(suggested_report_file_name(&note, session.offset(), "pdf")),
                Path::to_path_buf,
            );
            std::fs::write(&path, report.render_pdf())?;
            tracing::debug!("Wrote report for note {} to {}", note.id, path.display());
            println!("{}", path.display());
        }
    }

    Ok(())
}
