//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::MedicalArea;

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A journal note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Subject line shown in the sidebar
    pub title: String,
    /// Free text details
    pub body: String,
    /// Date of the entry (Unix ms)
    pub date: i64,
    /// Medical area, unset for a fresh note
    pub area: Option<MedicalArea>,
    /// National ID of the patient; never validated
    pub dni: String,
    /// Uploaded image URLs, in append order
    pub image_urls: Vec<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag
    pub is_deleted: bool,
}

impl Note {
    /// Create an empty note dated now
    #[must_use]
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: NoteId::new(),
            title: String::new(),
            body: String::new(),
            date: now,
            area: None,
            dni: String::new(),
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Create an empty note with the given title
    #[must_use]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::new()
        }
    }

    /// Apply a single field edit, leaving every other field untouched
    pub fn apply(&mut self, edit: NoteEdit) {
        match edit {
            NoteEdit::Title(title) => self.title = title,
            NoteEdit::Body(body) => self.body = body,
            NoteEdit::Date(date) => self.date = date,
            NoteEdit::Area(area) => self.area = area,
            NoteEdit::Dni(dni) => self.dni = dni,
        }
    }

    /// Area label, or an empty string when unset
    #[must_use]
    pub fn area_label(&self) -> &'static str {
        self.area.map_or("", MedicalArea::label)
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

/// One controlled form field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEdit {
    Title(String),
    Body(String),
    Date(i64),
    Area(Option<MedicalArea>),
    Dni(String),
}

impl NoteEdit {
    /// The form field this edit targets
    #[must_use]
    pub const fn field(&self) -> NoteField {
        match self {
            Self::Title(_) => NoteField::Title,
            Self::Body(_) => NoteField::Body,
            Self::Date(_) => NoteField::Date,
            Self::Area(_) => NoteField::Area,
            Self::Dni(_) => NoteField::Dni,
        }
    }
}

/// Names of the editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Title,
    Body,
    Date,
    Area,
    Dni,
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Body => "body",
            Self::Date => "date",
            Self::Area => "area",
            Self::Dni => "dni",
        };
        f.write_str(name)
    }
}
