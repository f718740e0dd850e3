//! Database layer for Bitácora

mod connection;
mod migrations;
mod repository;

pub use connection::{Database, DatabaseLocation, SyncConfig};
pub use repository::{LibSqlNoteRepository, NoteRepository};
