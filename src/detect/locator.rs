use crate::assets::decode::DecodedImage;
use crate::assets::photos::SourcePhoto;
use crate::foundation::core::{Point, Size};

/// Eye centers reported for one decoded image.
///
/// Coordinates are pixels with a **bottom-left** origin (y grows upward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeLocations {
    /// Center of the eye on the viewer's left.
    pub left_eye: Point,
    /// Center of the eye on the viewer's right.
    pub right_eye: Point,
    /// Size of the image the points were measured on.
    pub image_size: Size,
}

/// Reasons an eye locator gives up on an image.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectError {
    /// No face was found.
    #[error("no face detected")]
    NoFace,
    /// A face was found but one or both eye landmarks were missing.
    #[error("face has no usable eye landmarks")]
    NoLandmarks,
    /// The locator could not read the image it was given.
    #[error("eye locator could not decode the image")]
    DecodeFailed,
}

/// External face/landmark detection capability.
///
/// Only one face per photo is considered. Implementations receive the photo record alongside the
/// pixels so that precomputed landmark stores can key on it.
pub trait EyeLocator: Send {
    /// Locate both eye centers in `image`.
    fn detect(
        &mut self,
        photo: &SourcePhoto,
        image: &DecodedImage,
    ) -> Result<EyeLocations, DetectError>;
}
