//! Local directory storage, used when no cloud bucket is configured.

use std::path::{Path, PathBuf};

use super::{build_media_key, FileStorage, UploadFile};
use crate::models::NoteId;
use crate::Result;

/// Stores uploads under a root directory and hands out `file://` URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write(&self, note_id: NoteId, file: UploadFile) -> Result<String> {
        let key = build_media_key(&note_id, &file.file_name);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &file.bytes).await?;
        let path = tokio::fs::canonicalize(&path).await?;

        tracing::debug!(
            "Stored {} ({} bytes) at {}",
            file.file_name,
            file.bytes.len(),
            path.display()
        );
        Ok(format!("file://{}", path.display()))
    }
}

impl FileStorage for LocalFileStorage {
    fn upload(
        &self,
        note_id: NoteId,
        file: UploadFile,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        self.write(note_id, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn upload_writes_file_and_returns_file_url() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(tmp.path());
        let note_id = NoteId::new();

        let url = storage
            .upload(note_id, UploadFile::new("rx.png", b"png".to_vec()))
            .await
            .unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with("-rx.png"));
        let written = std::fs::read(url.trim_start_matches("file://")).unwrap();
        assert_eq!(written, b"png");
    }
}
