//! Cover image storage.
//!
//! Listings may carry an uploaded cover. The bytes go to a [`CoverStore`]
//! which hands back the public URL stored on the book. The default store
//! writes into `uploads.dir`, which the HTTP layer serves under
//! `uploads.public_base_url`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

use bookshare_http::AppError;
use bookshare_kernel::{settings::UploadSettings, InitCtx, Module};

const MAX_NAME_CHARS: usize = 100;
pub const UPLOAD_FAILED: &str = "Error uploading file";

/// A file part received with a listing.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[async_trait]
pub trait CoverStore: Send + Sync {
    /// Persist the upload and return the URL clients should load it from.
    async fn put(&self, upload: &CoverUpload) -> anyhow::Result<String>;
}

/// Stores covers as files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalCoverStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalCoverStore {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CoverStore for LocalCoverStore {
    async fn put(&self, upload: &CoverUpload) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let key = format!(
            "{}-{}",
            Uuid::now_v7().simple(),
            sanitize_file_name(upload.file_name.as_deref())
        );
        let path = self.dir.join(&key);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::debug!(key = %key, bytes = upload.bytes.len(), "cover stored");
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// Last path component of `name`, restricted to `[A-Za-z0-9._-]`.
fn sanitize_file_name(name: Option<&str>) -> String {
    let base = name
        .and_then(|n| n.rsplit(|c: char| c == '/' || c == '\\').next())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_CHARS)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "cover".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Check the size limit and hand the upload to `covers`.
pub async fn store_cover(
    covers: &dyn CoverStore,
    max_bytes: usize,
    upload: &CoverUpload,
) -> Result<String, AppError> {
    if upload.bytes.len() > max_bytes {
        return Err(AppError::bad_request(format!(
            "Cover image must be at most {max_bytes} bytes"
        )));
    }

    covers
        .put(upload)
        .await
        .map_err(|e| AppError::upstream(UPLOAD_FAILED, e))
}

/// Core module that prepares the local upload directory.
pub struct UploadsModule {
    dir: PathBuf,
}

impl UploadsModule {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
        }
    }
}

#[async_trait]
impl Module for UploadsModule {
    fn name(&self) -> &'static str {
        "uploads"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", self.dir.display()))?;
        tracing::info!(module = self.name(), dir = %self.dir.display(), "uploads module initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &'static [u8]) -> CoverUpload {
        CoverUpload {
            file_name: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("C:\\tmp\\my cover.png")), "my_cover.png");
        assert_eq!(sanitize_file_name(Some(".hidden")), "hidden");
        assert_eq!(sanitize_file_name(Some("")), "cover");
        assert_eq!(sanitize_file_name(None), "cover");
    }

    #[tokio::test]
    async fn local_store_writes_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalCoverStore::new(&UploadSettings {
            dir: dir.path().join("covers"),
            public_base_url: "/uploads/".to_string(),
            ..UploadSettings::default()
        });

        let url = store.put(&upload("dune.png", b"png-bytes")).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-dune.png"));

        let key = url.trim_start_matches("/uploads/");
        let written = std::fs::read(store.dir().join(key)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    struct FailingStore;

    #[async_trait]
    impl CoverStore for FailingStore {
        async fn put(&self, _upload: &CoverUpload) -> anyhow::Result<String> {
            anyhow::bail!("bucket unreachable")
        }
    }

    #[tokio::test]
    async fn store_cover_enforces_limit_and_maps_failures() {
        let oversized = store_cover(&FailingStore, 4, &upload("a.png", b"12345"))
            .await
            .unwrap_err();
        assert_eq!(oversized.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let failed = store_cover(&FailingStore, 1024, &upload("a.png", b"12345"))
            .await
            .unwrap_err();
        assert_eq!(failed.to_string(), UPLOAD_FAILED);
    }
}
