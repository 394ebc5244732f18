use std::path::{Path, PathBuf};

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{LapseError, LapseResult};

/// One photo of the montage, owned by the caller and read-only to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourcePhoto {
    /// Caller-assigned identifier, used for logging and eye lookups.
    pub id: String,
    /// Capture time in milliseconds; photos are exported in ascending order.
    pub timestamp_ms: i64,
    /// Opaque handle resolved by a [`PhotoLoader`].
    pub handle: String,
}

impl SourcePhoto {
    /// Create a photo record.
    pub fn new(id: impl Into<String>, timestamp_ms: i64, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp_ms,
            handle: handle.into(),
        }
    }
}

/// Sort photos by timestamp ascending.
///
/// The sort is stable, so photos sharing a timestamp keep their caller order.
pub fn sort_chronological(photos: &mut [SourcePhoto]) {
    photos.sort_by_key(|p| p.timestamp_ms);
}

/// Capability that turns a [`SourcePhoto`] handle into pixels.
///
/// Errors are treated as per-frame failures by the pipeline: the photo is skipped.
pub trait PhotoLoader: Send {
    /// Load and decode the photo.
    fn load(&self, photo: &SourcePhoto) -> LapseResult<DecodedImage>;
}

/// Loader resolving handles as relative paths under a root directory.
#[derive(Clone, Debug)]
pub struct FsPhotoLoader {
    root: PathBuf,
}

impl FsPhotoLoader {
    /// Resolve handles relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path the handle resolves to.
    pub fn resolve(&self, handle: &str) -> LapseResult<PathBuf> {
        let norm = normalize_rel_path(handle)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl PhotoLoader for FsPhotoLoader {
    fn load(&self, photo: &SourcePhoto) -> LapseResult<DecodedImage> {
        let path = self
            .resolve(&photo.handle)
            .map_err(|e| LapseError::frame(e.to_string()))?;
        let bytes = std::fs::read(&path).map_err(|e| {
            LapseError::frame(format!("failed to read photo '{}': {e}", path.display()))
        })?;
        decode_image(&bytes)
    }
}

/// Normalize and validate root-relative photo paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> LapseResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LapseError::validation("photo paths must be relative"));
    }
    if s.is_empty() {
        return Err(LapseError::validation("photo path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LapseError::validation("photo paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LapseError::validation(
            "photo path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/photos.rs"]
mod tests;
