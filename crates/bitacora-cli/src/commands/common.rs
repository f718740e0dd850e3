use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use bitacora_core::config::{Environment, JournalConfig};
use bitacora_core::journal::{Journal, Notifications};
use bitacora_core::models::NoteEdit;
use bitacora_core::services::DatabaseService;
use bitacora_core::storage::MediaStorage;
use bitacora_core::{MedicalArea, Note, NoteId};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::cli::FieldArgs;
use crate::error::CliError;

pub type CliJournal = Journal<DatabaseService, MediaStorage>;

/// Environment snapshot plus the settings resolved from it and the flags.
#[derive(Debug, Clone)]
pub struct Session {
    pub env: Environment,
    pub config: JournalConfig,
}

impl Session {
    pub fn resolve(db_path: Option<PathBuf>, user: Option<String>) -> Result<Self, CliError> {
        Self::from_environment(Environment::from_process(), db_path, user)
    }

    pub fn from_environment(
        env: Environment,
        db_path: Option<PathBuf>,
        user: Option<String>,
    ) -> Result<Self, CliError> {
        let mut config = JournalConfig::from_environment(&env)?;
        if let Some(path) = db_path {
            config.db_path = path;
        }
        if let Some(user) = user.and_then(|value| normalize_content(&value)) {
            config.user = user;
        }
        Ok(Self { env, config })
    }

    pub const fn offset(&self) -> &FixedOffset {
        &self.config.utc_offset
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub date: i64,
    pub area: Option<String>,
    pub dni: String,
    pub images: usize,
    pub updated_at: i64,
    pub relative_time: String,
}

pub async fn open_database(session: &Session) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(
        session.config.db_path.clone(),
        session.config.sync.clone(),
        &session.config.user,
    )
    .await?)
}

/// Open the journal with the user's notes loaded into its state.
pub async fn open_journal(session: &Session) -> Result<(CliJournal, Notifications), CliError> {
    let db = open_database(session).await?;
    let storage = MediaStorage::from_environment(&session.env, &session.config.media_dir)?;
    let (journal, notifications) = Journal::new(db, storage);
    journal.load_notes().await?;
    Ok((journal, notifications))
}

/// Resolve `note_query` and bind that note to the editor.
pub async fn activate_note(journal: &CliJournal, note_query: &str) -> Result<Note, CliError> {
    let normalized = normalize_note_identifier(note_query)?;
    let note = resolve_note_for_edit(&normalized, journal.store()).await?;
    Ok(journal.set_active_note(&note.id).await?)
}

pub async fn resolve_note_for_edit(
    note_query: &str,
    db: &DatabaseService,
) -> Result<Note, CliError> {
    if let Ok(note_id) = note_query.parse::<NoteId>() {
        if let Some(note) = db.get_note(&note_id).await? {
            return Ok(note);
        }
    }

    let matching_ids = db.list_note_ids_by_prefix(note_query, 3).await?;

    match matching_ids.len() {
        0 => Err(CliError::NoteNotFound(note_query.to_string())),
        1 => {
            let resolved_id = matching_ids[0]
                .parse::<NoteId>()
                .map_err(|_| CliError::NoteNotFound(note_query.to_string()))?;
            db.get_note(&resolved_id)
                .await?
                .ok_or_else(|| CliError::NoteNotFound(note_query.to_string()))
        }
        _ => {
            let options = matching_ids
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Turn the field flags into editor edits, in form order.
pub fn field_edits(fields: &FieldArgs, offset: &FixedOffset) -> Result<Vec<NoteEdit>, CliError> {
    let mut edits = Vec::new();
    if let Some(title) = &fields.title {
        edits.push(NoteEdit::Title(title.clone()));
    }
    if let Some(raw) = &fields.date {
        edits.push(NoteEdit::Date(parse_note_date(raw, offset)?));
    }
    if let Some(area) = &fields.area {
        edits.push(NoteEdit::Area(Some(area.parse::<MedicalArea>()?)));
    } else if fields.clear_area {
        edits.push(NoteEdit::Area(None));
    }
    if let Some(dni) = &fields.dni {
        edits.push(NoteEdit::Dni(dni.clone()));
    }
    if let Some(body) = &fields.body {
        edits.push(NoteEdit::Body(body.clone()));
    }
    Ok(edits)
}

/// Parse a date flag as wall time in `offset`, returning Unix milliseconds.
pub fn parse_note_date(raw: &str, offset: &FixedOffset) -> Result<i64, CliError> {
    let value = raw.trim();
    let invalid = || CliError::InvalidDate(value.to_string());

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.timestamp_millis());
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| invalid())?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|date_time| date_time.timestamp_millis())
        .ok_or_else(invalid)
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

pub fn format_note_lines<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .into_iter()
        .map(|note| {
            let id = short_id(&note.id.to_string());
            let title = title_preview(note, 40);
            let relative_time = format_relative_time(note.date, now_ms);
            let area = note.area_label();

            if area.is_empty() {
                format!("{id:<13}  {title:<40}  {relative_time}")
            } else {
                format!("{id:<13}  {title:<40}  {relative_time:<10}  {area}")
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        date: note.date,
        area: note.area.map(|area| area.label().to_string()),
        dni: note.dni.clone(),
        images: note.image_urls.len(),
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.date, now_ms),
    }
}

pub fn title_preview(note: &Note, max_chars: usize) -> String {
    let collapsed = note.title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "(sin título)".to_string();
    }

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Open the user's editor on `initial_content` and return what was saved.
///
/// An empty result is returned as `Some("")`; clearing the body is allowed.
pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let edited = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(edited.trim_end().to_string())
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("bitacora-note-{}-{now}.txt", std::process::id()))
}
