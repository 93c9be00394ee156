//! Media upload storage.
//!
//! Files are written under generated names into the uploads directory and
//! referenced by URL from content records. Nothing tracks which uploads are
//! still referenced.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::errors::AppError;
use crate::store::random_base36;

/// URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
];

const DEFAULT_EXTENSION: &str = ".jpg";

pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

/// An upload being streamed to disk.
///
/// The file is removed when the upload is dropped before [`finish`](Self::finish),
/// including when the request is cancelled mid-stream.
pub struct PendingUpload<'a> {
    store: &'a UploadStore,
    file: File,
    path: PathBuf,
    file_name: String,
    written: usize,
    settled: bool,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn too_large(&self) -> AppError {
        AppError::UploadRejected(format!(
            "File too large (max {}MB)",
            self.max_bytes / (1024 * 1024)
        ))
    }

    /// Check the MIME type and open a new file for the upload.
    pub async fn begin(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<PendingUpload<'_>, AppError> {
        check_mime(content_type.unwrap_or_default())?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::storage("create", &self.dir, e))?;

        let file_name = generate_file_name(original_name);
        let path = self.dir.join(&file_name);
        let file = File::create(&path)
            .await
            .map_err(|e| AppError::storage("create", &path, e))?;

        Ok(PendingUpload {
            store: self,
            file,
            path,
            file_name,
            written: 0,
            settled: false,
        })
    }

    /// Store a complete in-memory file. Returns the public URL.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<String, AppError> {
        let mut upload = self.begin(original_name, content_type).await?;
        upload.write(data).await?;
        upload.finish().await
    }
}

impl PendingUpload<'_> {
    /// Append a chunk, enforcing the size ceiling. Oversized uploads are deleted.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        self.written += chunk.len();
        if self.written > self.store.max_bytes {
            self.discard();
            return Err(self.store.too_large());
        }

        if let Err(e) = self.file.write_all(chunk).await {
            self.discard();
            return Err(AppError::storage("write", &self.path, e));
        }
        Ok(())
    }

    /// Flush the file and return its public URL.
    pub async fn finish(mut self) -> Result<String, AppError> {
        if let Err(e) = self.file.flush().await {
            self.discard();
            return Err(AppError::storage("write", &self.path, e));
        }
        self.settled = true;
        tracing::info!("Stored upload {} ({} bytes)", self.file_name, self.written);
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, self.file_name))
    }

    /// Remove the partial file, once.
    fn discard(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Discarded partial upload {}", self.file_name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove partial upload {}: {}", self.path.display(), e)
            }
        }
    }
}

impl Drop for PendingUpload<'_> {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Accept only the allow-listed image and video types (parameters are ignored).
pub fn check_mime(content_type: &str) -> Result<(), AppError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if ALLOWED_MIME_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        tracing::warn!("Rejected upload with content type {:?}", content_type);
        Err(AppError::UploadRejected(
            "Only image or video files are allowed".to_string(),
        ))
    }
}

/// `<millis>-<random><.ext>`, keeping the original extension when it is plain alphanumeric.
pub fn generate_file_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        random_base36(11),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_mime() {
        for ok in ["image/jpeg", "image/PNG", "video/mp4", "video/quicktime; codecs=x"] {
            assert!(check_mime(ok).is_ok(), "{} should be allowed", ok);
        }
        for bad in ["application/pdf", "text/html", "", "image/svg+xml"] {
            assert!(
                matches!(check_mime(bad), Err(AppError::UploadRejected(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_generate_file_name() {
        let name = generate_file_name(Some("photo.png"));
        assert!(name.ends_with(".png"));
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), 11 + ".png".len());

        assert!(generate_file_name(None).ends_with(".jpg"));
        assert!(generate_file_name(Some("noext")).ends_with(".jpg"));
        assert!(generate_file_name(Some("../../evil.p$p")).ends_with(".jpg"));
        assert_ne!(generate_file_name(None), generate_file_name(None));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), 1024);

        let url = store
            .save(Some("hero.webp"), Some("image/webp"), b"RIFF....WEBP")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        let file_name = url.trim_start_matches("/uploads/");
        let stored = std::fs::read(dir.path().join("uploads").join(file_name)).unwrap();
        assert_eq!(stored, b"RIFF....WEBP");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 8);

        let mut upload = store.begin(Some("big.mp4"), Some("video/mp4")).await.unwrap();
        upload.write(b"12345").await.unwrap();
        let err = upload.write(b"67890").await.unwrap_err();

        assert!(matches!(err, AppError::UploadRejected(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_upload_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path(), 1024);

        let mut upload = store.begin(Some("clip.mp4"), Some("video/mp4")).await.unwrap();
        upload.write(b"partial").await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        drop(upload);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_upload_task_is_removed() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(UploadStore::new(dir.path(), 1024));
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();

        let task = tokio::spawn({
            let store = store.clone();
            async move {
                let mut upload = store.begin(Some("a.jpg"), Some("image/jpeg")).await.unwrap();
                upload.write(b"first chunk").await.unwrap();
                let _ = started_tx.send(());
                // The rest of the body never arrives.
                std::future::pending::<()>().await;
            }
        });

        started_rx.await.unwrap();
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_type_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), 1024);

        let err = store
            .save(Some("doc.pdf"), Some("application/pdf"), b"%PDF")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Only image or video files are allowed");
        assert!(!dir.path().join("uploads").exists());
    }

    #[test]
    fn test_too_large_message() {
        let store = UploadStore::new("/tmp", 80 * 1024 * 1024);
        assert_eq!(store.too_large().to_string(), "File too large (max 80MB)");
    }
}
