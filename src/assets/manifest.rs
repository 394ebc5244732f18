use std::path::Path;

use anyhow::Context as _;

use crate::assets::photos::SourcePhoto;
use crate::foundation::error::{LapseError, LapseResult};

/// Eye pair as stored on disk: `[x, y]` pixels, bottom-left origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEyes {
    /// Viewer-left eye center.
    pub left: [f64; 2],
    /// Viewer-right eye center.
    pub right: [f64; 2],
}

/// One manifest row.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    /// Photo identifier (must be unique within the manifest).
    pub id: String,
    /// Capture time in milliseconds.
    pub timestamp_ms: i64,
    /// Path relative to the manifest's directory.
    pub path: String,
    /// Precomputed eye centers, if a detector has already run on this photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyes: Option<ManifestEyes>,
}

/// JSON description of a photo series.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoManifest {
    /// Photos in any order; the pipeline sorts them by timestamp.
    pub photos: Vec<ManifestEntry>,
}

impl PhotoManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json_str(s: &str) -> LapseResult<Self> {
        let manifest: Self = serde_json::from_str(s)
            .map_err(|e| LapseError::serde(format!("invalid photo manifest: {e}")))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: &Path) -> LapseResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Reject duplicate or empty ids and non-finite eye coordinates.
    pub fn validate(&self) -> LapseResult<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.photos {
            if entry.id.is_empty() {
                return Err(LapseError::validation("manifest photo id must be non-empty"));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(LapseError::validation(format!(
                    "duplicate manifest photo id '{}'",
                    entry.id
                )));
            }
            if let Some(eyes) = &entry.eyes
                && !eyes.left.iter().chain(&eyes.right).all(|v| v.is_finite())
            {
                return Err(LapseError::validation(format!(
                    "photo '{}' has non-finite eye coordinates",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Photo records for the pipeline, in manifest order.
    pub fn source_photos(&self) -> Vec<SourcePhoto> {
        self.photos
            .iter()
            .map(|e| SourcePhoto::new(e.id.clone(), e.timestamp_ms, e.path.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
