//! File storage backends for note image uploads.

mod local;
mod r2;

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::config::Environment;
use crate::models::NoteId;
use crate::util::sanitize_file_name;
use crate::{Error, Result};

pub use local::LocalFileStorage;
pub use r2::{R2Config, R2Storage};

/// A user-selected file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| Error::InvalidInput(format!("Not a file: {}", path.display())))?;
        let content_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Explicit content type, falling back to a guess from the file name.
    #[must_use]
    pub fn content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

/// Binary file storage returning retrievable URLs.
pub trait FileStorage: Send + Sync {
    /// Store one file attached to `note_id` and return its URL.
    fn upload(
        &self,
        note_id: NoteId,
        file: UploadFile,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// The storage backend picked from the environment: R2 when its variables
/// are set, the local media directory otherwise.
#[derive(Debug, Clone)]
pub enum MediaStorage {
    Local(LocalFileStorage),
    R2(R2Storage),
}

impl MediaStorage {
    pub fn from_environment(env: &Environment, media_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(match R2Config::from_environment(env)? {
            Some(config) => {
                tracing::debug!("Using R2 bucket {} for uploads", config.bucket);
                Self::R2(R2Storage::new(config))
            }
            None => Self::Local(LocalFileStorage::new(media_dir)),
        })
    }
}

impl FileStorage for MediaStorage {
    fn upload(
        &self,
        note_id: NoteId,
        file: UploadFile,
    ) -> impl Future<Output = Result<String>> + Send {
        async move {
            match self {
                Self::Local(storage) => storage.upload(note_id, file).await,
                Self::R2(storage) => storage.upload(note_id, file).await,
            }
        }
    }
}

/// Deterministic object key namespace for a note attachment.
pub fn build_media_key(note_id: &NoteId, file_name: &str) -> String {
    let ts = Utc::now().timestamp_millis();
    let id = Uuid::now_v7();
    format!(
        "notes/{note_id}/{ts}-{id}-{}",
        sanitize_file_name(file_name)
    )
}
