//! Note reports.
//!
//! A report is a read-only, single-page summary of one note with five labeled
//! fields. Dates are always rendered with the Spanish (Spain) wording in a
//! fixed UTC offset, so the same note renders the same report everywhere.

mod pdf;

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;

use crate::models::Note;
use crate::util::sanitize_token;

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Visibility of the report view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportView {
    #[default]
    Hidden,
    Shown,
}

impl ReportView {
    pub fn toggle(&mut self) {
        *self = match self {
            Self::Hidden => Self::Shown,
            Self::Shown => Self::Hidden,
        };
    }

    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Shown)
    }
}

/// Produces reports on demand; the visibility toggle is its only state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRenderer {
    view: ReportView,
    offset: FixedOffset,
}

impl ReportRenderer {
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            view: ReportView::Hidden,
            offset,
        }
    }

    pub fn toggle(&mut self) {
        self.view.toggle();
    }

    #[must_use]
    pub const fn view(&self) -> ReportView {
        self.view
    }

    /// The report for `note` while the view is shown.
    #[must_use]
    pub fn render(&self, note: &Note) -> Option<NoteReport> {
        self.view
            .is_shown()
            .then(|| NoteReport::from_note(note, &self.offset))
    }
}

/// The five labeled fields of a note report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteReport {
    pub title: String,
    pub date: String,
    pub dni: String,
    pub area: String,
    pub body: String,
}

impl NoteReport {
    #[must_use]
    pub fn from_note(note: &Note, offset: &FixedOffset) -> Self {
        Self {
            title: note.title.clone(),
            date: format_report_date(note.date, offset),
            dni: note.dni.clone(),
            area: note.area_label().to_string(),
            body: note.body.clone(),
        }
    }

    /// Label/value pairs in document order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Asunto", self.title.as_str()),
            ("Fecha", self.date.as_str()),
            ("DNI", self.dni.as_str()),
            ("Área", self.area.as_str()),
            ("Detalles", self.body.as_str()),
        ]
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let mut output = String::new();
        for (label, value) in self.fields() {
            let _ = writeln!(output, "{label}: {value}");
        }
        output
    }

    /// Encode the report as a one-page PDF document.
    #[must_use]
    pub fn render_pdf(&self) -> Vec<u8> {
        pdf::render_report(self)
    }
}

/// `"05 de marzo de 2024 - 14:30"`
#[must_use]
pub fn format_report_date(timestamp_ms: i64, offset: &FixedOffset) -> String {
    format_spanish_date(timestamp_ms, offset, " -")
}

/// `"05 de marzo de 2024, 14:30"`, as shown above the editor.
#[must_use]
pub fn format_header_date(timestamp_ms: i64, offset: &FixedOffset) -> String {
    format_spanish_date(timestamp_ms, offset, ",")
}

fn format_spanish_date(timestamp_ms: i64, offset: &FixedOffset, separator: &str) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return timestamp_ms.to_string();
    };
    let local = utc.with_timezone(offset);
    let month = SPANISH_MONTHS[local.month0() as usize];

    format!(
        "{:02} de {month} de {}{separator} {:02}:{:02}",
        local.day(),
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// File name for an exported report, e.g. `reporte-visita-20240305.pdf`.
#[must_use]
pub fn suggested_report_file_name(note: &Note, offset: &FixedOffset, extension: &str) -> String {
    let slug = sanitize_token(&note.title);
    let slug = if slug.is_empty() { "nota".to_string() } else { slug };
    let day = DateTime::from_timestamp_millis(note.date).map_or_else(
        || note.date.to_string(),
        |utc| utc.with_timezone(offset).format("%Y%m%d").to_string(),
    );
    format!("reporte-{slug}-{day}.{extension}")
}
