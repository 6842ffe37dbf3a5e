//! Local file storage for uploaded business logos.
//!
//! Files live under the configured upload directory and are served by
//! `ServeDir` at `/uploads`.

use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use slipbook_core::ProfileId;

/// Largest accepted logo, in bytes.
pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// URL prefix the upload directory is mounted at.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Content type is not an accepted image format.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// File exceeds [`MAX_LOGO_BYTES`].
    #[error("file is too large ({0} bytes)")]
    TooLarge(usize),

    /// Upload had no content.
    #[error("file is empty")]
    Empty,
}

/// Writes logos beneath a root directory.
#[derive(Debug, Clone)]
pub struct LogoStorage {
    root: PathBuf,
}

impl LogoStorage {
    /// Create storage rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store a logo and return its public URL.
    ///
    /// The file is written to `{user_id}/logo-{unix_millis}.{ext}`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the upload is rejected or cannot be written.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store_logo(
        &self,
        user_id: ProfileId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let extension = image_extension(content_type)
            .ok_or_else(|| StorageError::UnsupportedType(content_type.to_owned()))?;
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(StorageError::TooLarge(bytes.len()));
        }

        let relative = logo_path(user_id, Utc::now().timestamp_millis(), extension);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::info!(path = %relative, "Stored logo");
        Ok(format!("{PUBLIC_PREFIX}/{relative}"))
    }
}

/// Relative path of a logo upload.
fn logo_path(user_id: ProfileId, unix_millis: i64, extension: &str) -> String {
    format!("{user_id}/logo-{unix_millis}.{extension}")
}

/// File extension for an accepted image content type.
fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
