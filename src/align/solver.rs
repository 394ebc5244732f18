//! Similarity transform between a photo's eyes and the canvas eye reference.
//!
//! Three coordinate spaces meet here:
//!
//! - **measurement space**: eye locator output, pixels, bottom-left origin;
//! - **pixel space**: the same image, top-left origin (what the compositor draws from);
//! - **canvas space**: the output frame, top-left origin.
//!
//! [`solve`] flips measurements into pixel space and returns a transform from pixel space into
//! canvas space.

use crate::detect::locator::EyeLocations;
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::math::{angle_of, flip_y, wrap_angle};

/// Eye distances at or below this many source pixels are treated as coincident eyes.
pub const MIN_EYE_DISTANCE_PX: f64 = 0.1;

/// Eye positions in canvas space that every aligned frame is mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasEyeReference {
    /// Viewer-left eye, canvas pixels.
    pub left: Point,
    /// Viewer-right eye, canvas pixels.
    pub right: Point,
}

impl CanvasEyeReference {
    /// Vector from the left eye to the right eye.
    pub fn delta(&self) -> Vec2 {
        self.right - self.left
    }
}

/// Rotation + uniform scale + translation (no shear).
///
/// Applied to a point `p` as `translation + scale * R(rotation) * p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    /// Rotation in radians, in `(-pi, pi]`.
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Translation applied after rotation and scale.
    pub translation: Vec2,
}

impl SimilarityTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: 0.0,
        scale: 1.0,
        translation: Vec2::ZERO,
    };

    /// Equivalent kurbo affine.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation)
            * Affine::scale(self.scale)
            * Affine::rotate(self.rotation)
    }

    /// Map a pixel-space point into canvas space.
    pub fn apply(&self, p: Point) -> Point {
        self.to_affine() * p
    }
}

/// Why alignment was not attempted for a frame.
///
/// Not a pipeline failure: the caller composites the frame with plain aspect-fit instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlignmentSkip {
    /// The source eyes are closer than [`MIN_EYE_DISTANCE_PX`].
    DegenerateEyes {
        /// Measured eye distance in source pixels.
        distance: f64,
    },
    /// The reference eyes are closer than [`MIN_EYE_DISTANCE_PX`].
    DegenerateReference {
        /// Reference eye distance in canvas pixels.
        distance: f64,
    },
}

impl std::fmt::Display for AlignmentSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateEyes { distance } => {
                write!(f, "source eyes are {distance:.3}px apart")
            }
            Self::DegenerateReference { distance } => {
                write!(f, "reference eyes are {distance:.3}px apart")
            }
        }
    }
}

/// Source eyes converted from measurement space to top-left pixel space.
pub fn eyes_in_pixel_space(source: &EyeLocations) -> (Point, Point) {
    let h = source.image_size.height;
    (flip_y(source.left_eye, h), flip_y(source.right_eye, h))
}

/// Distance between the source eyes, in pixels.
pub fn eye_distance_px(source: &EyeLocations) -> f64 {
    (source.right_eye - source.left_eye).hypot()
}

/// Return `true` when eyes `distance` pixels apart can anchor or be aligned.
pub fn is_usable_eye_distance(distance: f64) -> bool {
    distance.is_finite() && distance > MIN_EYE_DISTANCE_PX
}

/// Solve the transform taking `source`'s eyes onto `reference`.
///
/// The transform is composed as: move the source left eye to the origin, rotate, scale, then move
/// the origin to `reference.left`. It maps the left eye exactly and the right eye up to the
/// rigid-face assumption.
pub fn solve(
    reference: &CanvasEyeReference,
    source: &EyeLocations,
) -> Result<SimilarityTransform, AlignmentSkip> {
    let (src_left, src_right) = eyes_in_pixel_space(source);
    let src_delta = src_right - src_left;
    let ref_delta = reference.delta();

    let src_dist = src_delta.hypot();
    if !is_usable_eye_distance(src_dist) {
        return Err(AlignmentSkip::DegenerateEyes { distance: src_dist });
    }
    let ref_dist = ref_delta.hypot();
    if !is_usable_eye_distance(ref_dist) {
        return Err(AlignmentSkip::DegenerateReference { distance: ref_dist });
    }

    let scale = ref_dist / src_dist;
    let rotation = wrap_angle(angle_of(ref_delta) - angle_of(src_delta));

    let composed = Affine::translate(reference.left.to_vec2())
        * Affine::scale(scale)
        * Affine::rotate(rotation)
        * Affine::translate(-src_left.to_vec2());
    let translation = composed.translation();

    Ok(SimilarityTransform {
        rotation,
        scale,
        translation,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/align/solver.rs"]
mod tests;
