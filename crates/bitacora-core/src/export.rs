//! Note export helpers shared by the front ends.

use std::fmt::Write as _;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::report::format_report_date;
use crate::Note;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable note representation used in JSON and Markdown exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNote {
    pub id: String,
    pub title: String,
    pub date: i64,
    pub area: Option<String>,
    pub dni: String,
    pub body: String,
    pub image_urls: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[must_use]
pub fn note_to_export_item(note: &Note) -> ExportNote {
    ExportNote {
        id: note.id.to_string(),
        title: note.title.clone(),
        date: note.date,
        area: note.area.map(|area| area.label().to_string()),
        dni: note.dni.clone(),
        body: note.body.clone(),
        image_urls: note.image_urls.clone(),
        created_at: note.created_at,
        updated_at: note.updated_at,
    }
}

/// Render notes as pretty-printed JSON.
pub fn render_json_export(notes: &[Note]) -> serde_json::Result<String> {
    let items = notes
        .iter()
        .map(note_to_export_item)
        .collect::<Vec<ExportNote>>();
    serde_json::to_string_pretty(&items)
}

/// Render notes in Markdown, one frontmatter block per note.
///
/// Frontmatter strings are written as quoted scalars so a field holding a
/// newline cannot add keys; the heading is the title on a single line. The
/// frontmatter carries the raw timestamps and the heading repeats the date in
/// the report wording for `offset`.
pub fn render_markdown_export(
    notes: &[Note],
    offset: &FixedOffset,
) -> serde_json::Result<String> {
    let mut output = String::new();

    for (index, note) in notes.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let item = note_to_export_item(note);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", item.id);
        let _ = writeln!(output, "date: {}", item.date);
        if let Some(area) = &item.area {
            let _ = writeln!(output, "area: {}", quoted(area)?);
        }
        if !item.dni.is_empty() {
            let _ = writeln!(output, "dni: {}", quoted(&item.dni)?);
        }
        let _ = writeln!(output, "created_at: {}", item.created_at);
        let _ = writeln!(output, "updated_at: {}", item.updated_at);
        if !item.image_urls.is_empty() {
            let _ = writeln!(output, "images:");
            for url in &item.image_urls {
                let _ = writeln!(output, "  - {}", quoted(url)?);
            }
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        let _ = writeln!(output, "# {}", single_line(&item.title));
        let _ = writeln!(output);
        let _ = writeln!(output, "_{}_", format_report_date(item.date, offset));
        let _ = writeln!(output);
        output.push_str(&item.body);
        output.push('\n');
    }

    Ok(output)
}

/// Double-quoted scalar; JSON string syntax is valid YAML.
fn quoted(value: &str) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Render notes based on selected export format.
pub fn render_notes_export(
    notes: &[Note],
    format: ExportFormat,
    offset: &FixedOffset,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(notes),
        ExportFormat::Markdown => render_markdown_export(notes, offset),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("bitacora-export-{timestamp_ms}.{}", format.extension())
}
