//! Uploaded product image storage.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Image file extensions accepted on upload.
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Errors storing an uploaded image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The file name has no extension or an unsupported one.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Writing to the uploads directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes product images to a directory under generated names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Store images under `dir`. The directory is created on first save.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory images are served from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an upload and return its stored name (`{uuid}.{ext}`).
    ///
    /// # Errors
    ///
    /// Returns `ImageError::UnsupportedType` if the original file name does
    /// not carry an allowed extension, or `ImageError::Io` if writing fails.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let extension = extension_of(original_name)?;
        let name = format!("{}.{extension}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        tracing::info!(image = %name, size = bytes.len(), "Stored product image");
        Ok(name)
    }

    /// Remove a previously stored image. Missing files are not an error.
    pub async fn remove(&self, name: &str) {
        // Stored names never contain separators
        if name.is_empty() || name.contains(['/', '\\']) {
            return;
        }
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => tracing::debug!(image = %name, "Removed product image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(image = %name, error = %e, "Failed to remove product image"),
        }
    }
}

fn extension_of(name: &str) -> Result<String, ImageError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ImageError::UnsupportedType(name.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ImageError::UnsupportedType(extension))
    }
}
