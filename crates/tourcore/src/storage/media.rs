//! Media file transfer: the store uploaded photos/audio live in, and the source
//! inbound files are pulled from.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::content::{FileRef, MediaKind};
use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Durable storage for media referenced by excursions.
#[async_trait]
pub trait FileGateway: Send + Sync {
    /// Stores `bytes` and returns the reference to keep on the entity.
    async fn upload(&self, bytes: Bytes, suggested_name: &str, directory: &str) -> AppResult<FileRef>;

    async fn fetch(&self, file: &FileRef) -> AppResult<Bytes>;

    /// Deleting a reference that is already gone succeeds.
    async fn delete(&self, file: &FileRef) -> AppResult<()>;
}

/// A file attached to an inbound chat message, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    /// Transport handle used to download the file (Telegram `file_id`).
    pub handle: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

impl IncomingFile {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            file_name: None,
            mime_type: None,
            size: None,
        }
    }

    /// Name to store the file under; photos arrive without one.
    pub fn suggested_name(&self, media: MediaKind) -> String {
        match &self.file_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => match media {
                MediaKind::Photo => "photo.jpg".to_string(),
                MediaKind::Audio => "audio.mp3".to_string(),
            },
        }
    }
}

/// Resolves inbound files to their bytes.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn download(&self, file: &IncomingFile) -> AppResult<Bytes>;
}

/// Keeps only characters that are safe in a path segment and a URL.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let limited: String = trimmed.chars().rev().take(config::media::MAX_FILE_NAME_LEN).collect();
    let limited: String = limited.chars().rev().collect();

    if limited.is_empty() {
        "file".to_string()
    } else {
        limited
    }
}

/// Media store on the local filesystem, keyed by `<directory>/<uuid>-<name>`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `MEDIA_ROOT`.
    pub fn from_env() -> Self {
        Self::new(config::MEDIA_ROOT.as_str())
    }

    fn resolve(&self, file: &FileRef) -> AppResult<PathBuf> {
        let relative = Path::new(file.as_str());
        let escapes = file.as_str().is_empty()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)));
        if escapes {
            return Err(AppError::Media(format!("invalid media key: {}", file)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileGateway for LocalMediaStore {
    async fn upload(&self, bytes: Bytes, suggested_name: &str, directory: &str) -> AppResult<FileRef> {
        let directory = sanitize_file_name(directory);
        let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(suggested_name));
        let file = FileRef::new(format!("{}/{}", directory, name));
        let path = self.resolve(&file)?;

        fs_err::tokio::create_dir_all(self.root.join(&directory)).await?;
        fs_err::tokio::write(&path, &bytes).await?;
        log::debug!("Stored {} bytes as {}", bytes.len(), file);
        Ok(file)
    }

    async fn fetch(&self, file: &FileRef) -> AppResult<Bytes> {
        let path = self.resolve(file)?;
        match fs_err::tokio::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(file.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, file: &FileRef) -> AppResult<()> {
        let path = self.resolve(file)?;
        match fs_err::tokio::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("Эрмитаж тур.mp3"), format!("{}.mp3", "_".repeat(11)));
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn long_names_keep_their_extension() {
        let name = format!("{}.jpg", "a".repeat(200));
        let sanitized = sanitize_file_name(&name);
        assert_eq!(sanitized.len(), config::media::MAX_FILE_NAME_LEN);
        assert!(sanitized.ends_with(".jpg"));
    }

    #[test]
    fn suggested_name_falls_back_per_media() {
        let photo = IncomingFile::new("AgAD");
        assert_eq!(photo.suggested_name(MediaKind::Photo), "photo.jpg");

        let mut audio = IncomingFile::new("CQAD");
        audio.file_name = Some("guide.ogg".into());
        assert_eq!(audio.suggested_name(MediaKind::Audio), "guide.ogg");
    }

    #[tokio::test]
    async fn upload_fetch_delete_cycle() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let file = store
            .upload(Bytes::from_static(b"jpeg"), "fountain.jpg", "photos")
            .await
            .unwrap();
        assert!(file.as_str().starts_with("photos/"));
        assert!(file.as_str().ends_with("-fountain.jpg"));
        assert_eq!(store.fetch(&file).await.unwrap(), Bytes::from_static(b"jpeg"));

        store.delete(&file).await.unwrap();
        assert!(matches!(store.fetch(&file).await, Err(AppError::NotFound(_))));
        // second delete is a no-op
        store.delete(&file).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_keys_outside_the_root() {
        let dir = tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        for key in ["../secret", "/etc/passwd", ""] {
            assert!(matches!(store.fetch(&FileRef::new(key)).await, Err(AppError::Media(_))), "{key}");
        }
    }
}
