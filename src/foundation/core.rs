use crate::foundation::error::{LapseError, LapseResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// 0-based index of a frame in output timeline space.
///
/// This counts frames *appended* to the encoder, not source photos.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Frame rates offered for export.
    pub const MENU: [u32; 6] = [5, 10, 15, 24, 30, 60];

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> LapseResult<Self> {
        if den == 0 {
            return Err(LapseError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(LapseError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Create an integral FPS value restricted to [`Fps::MENU`].
    pub fn from_menu(fps: u32) -> LapseResult<Self> {
        if !Self::MENU.contains(&fps) {
            return Err(LapseError::validation(format!(
                "fps {fps} is not one of {:?}",
                Self::MENU
            )));
        }
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Canvas {
    /// Create a canvas of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Canvas size as a kurbo [`Size`].
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Byte length of a tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Validate dimensions for yuv420p output (non-zero and even).
    pub fn validate(self) -> LapseResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LapseError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(LapseError::validation(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(LapseError::validation(
                "canvas width/height must fit in 16 bits",
            ));
        }
        Ok(())
    }
}

/// Straight-alpha RGBA8 → premultiplied RGBA8.
pub(crate) fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let a16 = u16::from(a);
    let premul = |c: u8| -> u8 { crate::foundation::math::mul_div255_u8(u16::from(c), a16) };
    [premul(r), premul(g), premul(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
