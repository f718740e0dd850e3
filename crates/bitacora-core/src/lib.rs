//! bitacora-core - Core library for Bitácora
//!
//! This crate contains the note models, the shared journal state, the editor
//! and search components, report rendering, and the persistence and file
//! storage layers used by the Bitácora front ends.

pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod export;
pub mod journal;
pub mod models;
pub mod report;
pub mod search;
pub mod services;
pub mod state;
pub mod storage;
mod util;

pub use error::{Error, Result};
pub use models::{MedicalArea, Note, NoteId};
