use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::UploadError;
use crate::models::ImageHandle;

/// Persists uploaded images under a single directory and hands out handles to them.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the bytes to `<uuid>-<client file name>` so concurrent uploads of
    /// the same name never overwrite each other.
    pub async fn persist(&self, filename: Option<&str>, bytes: &[u8]) -> Result<ImageHandle, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::MissingImage);
        }
        let format = image::guess_format(bytes).map_err(|_| UploadError::UnsupportedFormat)?;

        let name = format!("{}-{}", Uuid::new_v4(), sanitize(filename, format));
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), format = ?format, "Received image");
        Ok(ImageHandle::new(path))
    }
}

/// Keeps only the final path component of the client-supplied name.
fn sanitize(filename: Option<&str>, format: image::ImageFormat) -> String {
    filename
        .and_then(|f| Path::new(f).file_name())
        .and_then(|f| f.to_str())
        .filter(|f| !f.starts_with('.'))
        .map(str::to_string)
        .unwrap_or_else(|| {
            let ext = format.extensions_str().first().copied().unwrap_or("img");
            format!("upload.{}", ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[tokio::test]
    async fn test_persist_writes_bytes_under_dir() {
        let temp = TempDir::new().unwrap();
        let store = UploadStore::new(temp.path().join("uploads")).await.unwrap();

        let handle = store.persist(Some("banana.png"), PNG_MAGIC).await.unwrap();

        assert!(handle.path().starts_with(store.dir()));
        assert!(handle.path().to_string_lossy().ends_with("-banana.png"));
        assert_eq!(handle.read_bytes().await.unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_persist_strips_directories_from_name() {
        let temp = TempDir::new().unwrap();
        let store = UploadStore::new(temp.path()).await.unwrap();

        let handle = store.persist(Some("../../etc/passwd.png"), PNG_MAGIC).await.unwrap();

        assert_eq!(handle.path().parent(), Some(temp.path()));
        assert!(handle.path().to_string_lossy().ends_with("-passwd.png"));
    }

    #[tokio::test]
    async fn test_persist_rejects_non_images() {
        let temp = TempDir::new().unwrap();
        let store = UploadStore::new(temp.path()).await.unwrap();

        let err = store.persist(Some("notes.txt"), b"just some text").await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat));

        let err = store.persist(Some("empty.png"), b"").await.unwrap_err();
        assert!(matches!(err, UploadError::MissingImage));
    }

    #[test]
    fn test_sanitize_defaults_name_from_format() {
        assert_eq!(sanitize(None, image::ImageFormat::Png), "upload.png");
        assert_eq!(sanitize(Some(".hidden"), image::ImageFormat::Jpeg), "upload.jpg");
    }
}
