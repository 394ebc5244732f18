use std::collections::HashMap;

use crate::assets::decode::DecodedImage;
use crate::assets::manifest::{ManifestEyes, PhotoManifest};
use crate::assets::photos::SourcePhoto;
use crate::detect::locator::{DetectError, EyeLocations, EyeLocator};
use crate::foundation::core::Point;

/// Eye locator answering from landmarks stored in a [`PhotoManifest`].
///
/// Photos without an `eyes` entry report [`DetectError::NoFace`]; entries whose points fall
/// outside the decoded image report [`DetectError::NoLandmarks`].
#[derive(Clone, Debug, Default)]
pub struct ManifestEyeLocator {
    eyes: HashMap<String, ManifestEyes>,
}

impl ManifestEyeLocator {
    /// Index the eye entries of `manifest` by photo id.
    pub fn new(manifest: &PhotoManifest) -> Self {
        let eyes = manifest
            .photos
            .iter()
            .filter_map(|e| e.eyes.map(|eyes| (e.id.clone(), eyes)))
            .collect();
        Self { eyes }
    }

    /// Add or replace the eyes for one photo id.
    pub fn insert(&mut self, id: impl Into<String>, eyes: ManifestEyes) {
        self.eyes.insert(id.into(), eyes);
    }
}

impl EyeLocator for ManifestEyeLocator {
    fn detect(
        &mut self,
        photo: &SourcePhoto,
        image: &DecodedImage,
    ) -> Result<EyeLocations, DetectError> {
        let eyes = self.eyes.get(&photo.id).ok_or(DetectError::NoFace)?;
        let size = image.size();
        let inside = |p: [f64; 2]| {
            (0.0..=size.width).contains(&p[0]) && (0.0..=size.height).contains(&p[1])
        };
        if !inside(eyes.left) || !inside(eyes.right) {
            return Err(DetectError::NoLandmarks);
        }
        Ok(EyeLocations {
            left_eye: Point::new(eyes.left[0], eyes.left[1]),
            right_eye: Point::new(eyes.right[0], eyes.right[1]),
            image_size: size,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/manifest.rs"]
mod tests;
