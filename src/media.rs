//! Validation and on-disk storage for uploaded recipe images.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use uuid::Uuid;

/// Allowed image formats for recipe images.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to read image: {0}")]
    Unreadable(std::io::Error),

    #[error("Could not detect image format")]
    UnknownFormat,

    #[error("Unsupported image format: {0:?}. Allowed: JPEG, PNG, GIF, WebP")]
    UnsupportedFormat(ImageFormat),

    #[error("Failed to write image file: {0}")]
    Write(std::io::Error),
}

/// Directory where uploaded images live, from MEDIA_ROOT (default "media").
pub fn media_root() -> PathBuf {
    std::env::var("MEDIA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("media"))
}

/// Validate image data by magic bytes and return the detected format.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, MediaError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(MediaError::Unreadable)?;

    let format = reader.format().ok_or(MediaError::UnknownFormat)?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(MediaError::UnsupportedFormat(format));
    }

    Ok(format)
}

/// Generate a unique relative path for a recipe image: `recipe/<uuid>.<ext>`.
///
/// The filename is always a freshly generated UUID so concurrent uploads can
/// never collide; only the extension of the detected format is kept.
pub fn image_file_path(format: ImageFormat) -> String {
    let ext = format.extensions_str().first().copied().unwrap_or("bin");
    format!("recipe/{}.{}", Uuid::new_v4(), ext)
}

/// Write image bytes under the media root, creating directories as needed.
/// Returns the absolute path written to.
pub fn store_image(media_root: &Path, relative: &str, data: &[u8]) -> Result<PathBuf, MediaError> {
    let full = media_root.join(relative);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).map_err(MediaError::Write)?;
    }
    std::fs::write(&full, data).map_err(MediaError::Write)?;
    Ok(full)
}

/// Remove a previously stored image, ignoring files already gone.
pub fn remove_image(media_root: &Path, relative: &str) {
    let full = media_root.join(relative);
    if let Err(e) = std::fs::remove_file(&full) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove old image {}: {}", full.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal valid 1x1 PNG
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_validate_png() {
        assert!(matches!(validate_image(PNG_BYTES), Ok(ImageFormat::Png)));
    }

    #[test]
    fn test_validate_rejects_non_image() {
        let err = validate_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, MediaError::UnknownFormat));
    }

    #[test]
    fn test_image_file_path_keeps_extension() {
        let path = image_file_path(ImageFormat::Jpeg);
        assert!(path.starts_with("recipe/"));
        assert!(path.ends_with(".jpg"));
    }

    #[test]
    fn test_image_file_path_is_unique() {
        assert_ne!(
            image_file_path(ImageFormat::Png),
            image_file_path(ImageFormat::Png)
        );
    }

    #[test]
    fn test_store_and_remove_image() {
        let dir = tempfile::tempdir().unwrap();
        let rel = image_file_path(ImageFormat::Png);

        let full = store_image(dir.path(), &rel, PNG_BYTES).unwrap();
        assert_eq!(std::fs::read(&full).unwrap(), PNG_BYTES);

        remove_image(dir.path(), &rel);
        assert!(!full.exists());

        // Removing twice is fine
        remove_image(dir.path(), &rel);
    }
}
