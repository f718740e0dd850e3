//! Runtime configuration.
//!
//! [`Environment`] is a flat snapshot of the process environment with no
//! schema of its own. [`JournalConfig`] resolves the handful of values the
//! front ends need from it; anything it does not read (credentials for a
//! backend, for instance) only fails once the dependent call is made.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

use crate::db::SyncConfig;
use crate::util::normalize_text_option;
use crate::{Error, Result};

pub const ENV_DB_PATH: &str = "BITACORA_DB_PATH";
pub const ENV_USER: &str = "BITACORA_USER";
pub const ENV_UTC_OFFSET: &str = "BITACORA_UTC_OFFSET";
pub const ENV_MEDIA_DIR: &str = "BITACORA_MEDIA_DIR";
pub const ENV_TURSO_URL: &str = "TURSO_DATABASE_URL";
pub const ENV_TURSO_TOKEN: &str = "TURSO_AUTH_TOKEN";

const DEFAULT_USER: &str = "local";

/// Flat key/value view of the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Snapshot the current process environment.
    ///
    /// Callers that want `.env` support load it with `dotenvy` first.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: pairs.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        normalize_text_option(self.get(key).map(ToOwned::to_owned))
    }
}

/// Settings resolved for one journal session.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Local database file (the replica file when sync is on)
    pub db_path: PathBuf,
    /// Owner id of the note collection
    pub user: String,
    /// Offset used to render dates in reports and headers
    pub utc_offset: FixedOffset,
    /// Directory used by the local upload store
    pub media_dir: PathBuf,
    /// Embedded replica settings, when both Turso variables are set
    pub sync: Option<SyncConfig>,
}

impl JournalConfig {
    pub fn from_environment(env: &Environment) -> Result<Self> {
        let utc_offset = match env.non_empty(ENV_UTC_OFFSET) {
            Some(raw) => parse_utc_offset(&raw)?,
            None => utc(),
        };

        let sync = match (env.non_empty(ENV_TURSO_URL), env.non_empty(ENV_TURSO_TOKEN)) {
            (Some(url), Some(token)) => Some(SyncConfig::new(url, token)),
            _ => None,
        };

        Ok(Self {
            db_path: env
                .non_empty(ENV_DB_PATH)
                .map_or_else(default_db_path, PathBuf::from),
            user: env
                .non_empty(ENV_USER)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            utc_offset,
            media_dir: env
                .non_empty(ENV_MEDIA_DIR)
                .map_or_else(default_media_dir, PathBuf::from),
            sync,
        })
    }
}

/// Parse a fixed offset: `+HH:MM`, `-HHMM`, a bare signed hour (`-3`),
/// `Z`, or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let invalid = |_: chrono::ParseError| {
        Error::InvalidInput(format!("Invalid UTC offset '{value}', expected +HH:MM"))
    };

    match bare_hour_offset(value) {
        Some(expanded) => expanded.parse::<FixedOffset>().map_err(invalid),
        None => value.parse::<FixedOffset>().map_err(invalid),
    }
}

/// `-3` becomes `-03:00`; anything else is left to chrono.
fn bare_hour_offset(value: &str) -> Option<String> {
    let sign = value.chars().next().filter(|c| matches!(c, '+' | '-'))?;
    let hours = &value[1..];
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{sign}{hours:0>2}:00"))
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("bitacora")
}

pub fn default_db_path() -> PathBuf {
    data_dir().join("bitacora.db")
}

pub fn default_media_dir() -> PathBuf {
    data_dir().join("media")
}
