use crate::align::solver::{CanvasEyeReference, eyes_in_pixel_space};
use crate::detect::locator::EyeLocations;
use crate::render::compositor::FitRect;

/// Set-once eye anchor for one export.
///
/// The only transition is `Unset -> Established`; establishing an already established reference
/// returns it unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EyeReference {
    /// No frame has produced a usable detection yet.
    #[default]
    Unset,
    /// Anchor captured from the first frame with a usable detection.
    Established(CanvasEyeReference),
}

impl EyeReference {
    /// Return the established anchor, if any.
    pub fn get(&self) -> Option<&CanvasEyeReference> {
        match self {
            Self::Unset => None,
            Self::Established(r) => Some(r),
        }
    }

    /// Return `true` once an anchor has been captured.
    pub fn is_established(&self) -> bool {
        matches!(self, Self::Established(_))
    }

    /// Capture `candidate` if no anchor exists yet.
    pub fn establish(self, candidate: CanvasEyeReference) -> Self {
        match self {
            Self::Unset => Self::Established(candidate),
            established => established,
        }
    }
}

/// Map a detection through the aspect-fit geometry into canvas space.
///
/// The reference frame itself is drawn with the same [`FitRect`], so the anchor lands exactly on
/// that frame's eyes.
pub fn reference_from_fit(source: &EyeLocations, fit: &FitRect) -> CanvasEyeReference {
    let (left, right) = eyes_in_pixel_space(source);
    let to_canvas = fit.to_affine();
    CanvasEyeReference {
        left: to_canvas * left,
        right: to_canvas * right,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/align/reference.rs"]
mod tests;
