//! On-disk storage for uploaded photo files.
//!
//! Uploads are written under a generated `uuid.<ext>` name so that user
//! supplied file names never touch the filesystem. Resized renditions are
//! produced externally and served from `img{size}/` sub-directories.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

/// Extensions accepted by the upload forms.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpe", "jpeg", "png", "gif", "svg", "bmp", "webp"];

/// Whether a client-supplied file name looks like an image we accept.
pub fn is_allowed_image(filename: &str) -> bool {
    image_extension(filename).is_some()
}

/// Lower-cased extension of `filename`, if it is an accepted image type.
fn image_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    base_path: PathBuf,
    max_size: usize,
}

impl MediaStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, AppError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            AppError::MediaStorage(format!(
                "Failed to create media directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Media store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store an uploaded file and return the generated file name.
    ///
    /// The original name only contributes its extension, which must be in
    /// [`IMAGE_EXTENSIONS`].
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Empty upload".to_string()));
        }
        if data.len() > self.max_size {
            return Err(AppError::UploadTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let ext = image_extension(original_name).ok_or_else(|| {
            AppError::BadRequest(format!("Not an accepted image type: {original_name}"))
        })?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.safe_path(&filename)?;

        fs::write(&path, data).await.map_err(|e| {
            AppError::MediaStorage(format!("Failed to write media file {filename}: {e}"))
        })?;

        debug!(file = %filename, size = data.len(), "Stored media file");
        Ok(filename)
    }

    /// Remove a stored file. Missing files are not an error; the database
    /// record is authoritative and orphaned names are simply logged.
    pub async fn remove(&self, filename: &str) -> Result<(), AppError> {
        let path = self.safe_path(filename)?;

        if !path.exists() {
            debug!(file = %filename, "Media file already gone");
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            AppError::MediaStorage(format!("Failed to delete media file {filename}: {e}"))
        })?;

        debug!(file = %filename, "Deleted media file");
        Ok(())
    }

    /// Resolve a stored file name inside the media directory, rejecting
    /// anything that could escape it.
    fn safe_path(&self, filename: &str) -> Result<PathBuf, AppError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(AppError::BadRequest("Path traversal detected".to_string()));
        }
        Ok(self.base_path.join(filename))
    }
}
