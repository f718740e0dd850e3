use std::path::{Path, PathBuf};

use bitacora_core::export::{render_notes_export, suggested_export_file_name};
use chrono::Utc;

use crate::cli::ExportFormat;
use crate::commands::common::{open_database, Session};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    session: &Session,
) -> Result<(), CliError> {
    let notes = open_database(session).await?.list_notes().await?;
    let rendered = render_notes_export(&notes, format.into(), session.offset())?;

    if let Some(path) = output_path {
        let path = export_target(path, format);
        std::fs::write(&path, rendered)?;
        tracing::debug!("Exported {} notes to {}", notes.len(), path.display());
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// An existing directory gets a timestamped file name inside it.
fn export_target(path: &Path, format: ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(
            format.into(),
            Utc::now().timestamp_millis(),
        ))
    } else {
        path.to_path_buf()
    }
}
