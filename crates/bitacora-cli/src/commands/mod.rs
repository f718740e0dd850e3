pub mod areas;
pub mod attach;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod new;
pub mod report;
pub mod show;
pub mod sync;
