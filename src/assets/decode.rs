use std::sync::Arc;

use crate::foundation::core::{Size, premul_rgba8};
use crate::foundation::error::{LapseError, LapseResult};

/// Decoded raster photo in premultiplied RGBA8 form.
///
/// One instance per decode; eye locations reported for it are only valid for this instance.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Build from straight-alpha RGBA8 bytes (`width * height * 4` long).
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> LapseResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| LapseError::frame("image size overflow"))?;
        if rgba.len() != expected {
            return Err(LapseError::frame(format!(
                "rgba8 byte length {} does not match {width}x{height}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Image size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> LapseResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| LapseError::frame(format!("failed to decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(LapseError::frame("decoded image has zero size"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let p = premul_rgba8([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&p);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
