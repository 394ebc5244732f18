use crate::foundation::core::Canvas;
use crate::foundation::error::{LapseError, LapseResult};

/// A composited frame as premultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, premultiplied alpha.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Allocate a fully transparent frame the size of `canvas`.
    ///
    /// Allocation failure is reported as a recoverable frame error.
    pub fn transparent(canvas: Canvas) -> LapseResult<Self> {
        let len = canvas.rgba_len();
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            LapseError::frame(format!(
                "failed to allocate {}x{} frame buffer: {e}",
                canvas.width, canvas.height
            ))
        })?;
        data.resize(len, 0);
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    /// Return `true` when the frame matches `canvas` exactly.
    pub fn matches(&self, canvas: Canvas) -> bool {
        self.width == canvas.width
            && self.height == canvas.height
            && self.data.len() == canvas.rgba_len()
    }

    /// Read one pixel. Returns `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}
