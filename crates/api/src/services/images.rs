//! Recipe image storage.
//!
//! Validates uploaded bytes as a raster image and keeps the binaries on the
//! local filesystem under the configured media root. File names are
//! generated server-side (`recipe-{id}-{uuid}.{ext}`), so nothing
//! client-controlled ever reaches the filesystem; stale binaries are
//! released when an image is replaced or its recipe is deleted.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use ladle_core::RecipeId;

use crate::error::AppError;

/// Errors from image validation and storage.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The bytes do not decode as an image.
    #[error("upload is not a valid image")]
    InvalidImage,
    /// The bytes decode, but the format is not one we store.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    /// Filesystem failure while writing or deleting.
    #[error("image storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            // Invalid uploads are the client's fault: bad request, not a
            // server error.
            ImageError::InvalidImage | ImageError::UnsupportedFormat(_) => {
                Self::Validation(err.to_string())
            }
            ImageError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

/// Stores recipe images under a media root directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// save if it does not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The media root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `bytes` as a supported raster image and return the file
    /// extension to store it under.
    ///
    /// The bytes are fully decoded, not just sniffed, so a file with a
    /// plausible magic number and a corrupt body is still rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImage`] if the bytes do not decode, or
    /// [`ImageError::UnsupportedFormat`] for formats outside PNG/JPEG/GIF/WebP.
    pub fn validate(bytes: &[u8]) -> Result<&'static str, ImageError> {
        let format = image::guess_format(bytes).map_err(|_| ImageError::InvalidImage)?;

        let ext = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            other => {
                return Err(ImageError::UnsupportedFormat(format!("{other:?}")));
            }
        };

        image::load_from_memory_with_format(bytes, format)
            .map_err(|_| ImageError::InvalidImage)?;

        Ok(ext)
    }

    /// Validate and persist an uploaded image, returning the stored file
    /// name (not a full path) for the database.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if validation or the filesystem write fails.
    pub async fn save(&self, recipe: RecipeId, bytes: &[u8]) -> Result<String, ImageError> {
        let ext = Self::validate(bytes)?;
        let file_name = format!("recipe-{recipe}-{}.{ext}", Uuid::new_v4().simple());

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        Ok(file_name)
    }

    /// Release a stored binary.
    ///
    /// Best-effort: a missing file or filesystem error is logged, never
    /// surfaced, since the database state has already moved on.
    pub async fn remove(&self, file_name: &str) {
        // Stored names are always server-generated; anything else is stale
        // or corrupt database state, not a file we should touch.
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            tracing::warn!(file_name, "refusing to remove suspicious image path");
            return;
        }

        if let Err(e) = tokio::fs::remove_file(self.root.join(file_name)).await {
            tracing::warn!(file_name, error = %e, "failed to remove stored image");
        }
    }

    /// Public URL for a stored file name.
    #[must_use]
    pub fn url(file_name: &str) -> String {
        format!("/media/{file_name}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::new(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn temp_store() -> ImageStore {
        ImageStore::new(std::env::temp_dir().join(format!("ladle-images-{}", Uuid::new_v4())))
    }

    #[test]
    fn test_validate_png() {
        assert_eq!(ImageStore::validate(&png_bytes()).unwrap(), "png");
    }

    #[test]
    fn test_validate_rejects_junk() {
        assert!(matches!(
            ImageStore::validate(b"notanimage"),
            Err(ImageError::InvalidImage)
        ));
    }

    #[test]
    fn test_validate_rejects_truncated_png() {
        let mut bytes = png_bytes();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            ImageStore::validate(&bytes),
            Err(ImageError::InvalidImage)
        ));
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let store = temp_store();
        let name = store.save(RecipeId::new(1), &png_bytes()).await.unwrap();

        assert!(name.starts_with("recipe-1-"));
        assert!(name.ends_with(".png"));
        assert!(store.root().join(&name).exists());

        store.remove(&name).await;
        assert!(!store.root().join(&name).exists());

        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_refuses_traversal() {
        let store = temp_store();
        // Must not panic or escape the root; nothing to assert beyond "no effect".
        store.remove("../outside.png").await;
    }

    #[test]
    fn test_url() {
        assert_eq!(ImageStore::url("recipe-1-abc.png"), "/media/recipe-1-abc.png");
    }
}
