//! Data models for Bitácora

mod area;
mod note;

pub use area::MedicalArea;
pub use note::{Note, NoteEdit, NoteField, NoteId};
