//! Local-disk storage for progress photo files.
//!
//! Files live under the configured media root at
//! `photos/<profile_id>/<uuid>.<ext>`; the database stores that relative
//! path. Image dimensions are read from the file header at upload time.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use image::ImageReader;
use uuid::Uuid;

use glow_core::types::DbId;

use crate::error::AppError;

const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

#[derive(Debug)]
pub struct MediaStore {
    root: PathBuf,
}

/// Result of persisting an upload.
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub relative_path: String,
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn extension_for(content_type: &str) -> Option<&'static str> {
        ALLOWED_CONTENT_TYPES
            .iter()
            .find(|(ct, _)| *ct == content_type)
            .map(|(_, ext)| *ext)
    }

    pub async fn save_photo(
        &self,
        profile_id: DbId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredPhoto, AppError> {
        let ext = Self::extension_for(content_type).ok_or_else(|| {
            AppError::Validation(format!("Unsupported photo content type: {content_type}"))
        })?;
        let relative_path = format!("photos/{profile_id}/{}.{ext}", Uuid::new_v4());
        let absolute = self.resolve(&relative_path)?;
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("media directory create failed: {e}")))?;
        }
        tokio::fs::write(&absolute, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("media write failed: {e}")))?;

        let dimensions = read_dimensions(bytes);
        Ok(StoredPhoto {
            relative_path,
            size_bytes: bytes.len() as i64,
            width: dimensions.map(|(w, _)| w as i32),
            height: dimensions.map(|(_, h)| h as i32),
        })
    }

    pub async fn read(&self, relative_path: &str) -> Result<Vec<u8>, AppError> {
        let absolute = self.resolve(relative_path)?;
        tokio::fs::read(&absolute)
            .await
            .map_err(|e| AppError::Internal(format!("media read failed: {e}")))
    }

    /// Remove the stored file. Missing files are fine; the row is the
    /// source of truth and the sweep direction is row-first.
    pub async fn delete(&self, relative_path: &str) -> Result<(), AppError> {
        let absolute = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&absolute).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("media delete failed: {e}"))),
        }
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(relative_path);
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(AppError::Validation("Invalid media path".to_string()));
        }
        Ok(self.root.join(rel))
    }
}

/// Header-only dimension probe; `None` for files the decoder cannot
/// identify, which is not an upload failure.
fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
