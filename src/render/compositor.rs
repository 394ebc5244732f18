use std::sync::Arc;

use crate::align::solver::SimilarityTransform;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Canvas, Rect, Size, Vec2};
use crate::foundation::error::{LapseError, LapseResult};
use crate::render::frame::FrameRGBA;

/// Aspect-fit placement of an image inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitRect {
    /// Uniform scale from image pixels to canvas pixels.
    pub scale: f64,
    /// Canvas-space offset of the image's top-left corner.
    pub offset: Vec2,
}

impl FitRect {
    /// Fit `image` entirely inside `canvas`, preserving aspect ratio and centering the result.
    pub fn compute(image: Size, canvas: Canvas) -> Self {
        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        let iw = image.width.max(1.0);
        let ih = image.height.max(1.0);

        if iw / ih < canvas.aspect() {
            // Relatively taller: fill the height, pillarbox left/right.
            let scale = ch / ih;
            Self {
                scale,
                offset: Vec2::new((cw - iw * scale) * 0.5, 0.0),
            }
        } else {
            // Relatively wider (or equal): fill the width, letterbox top/bottom.
            let scale = cw / iw;
            Self {
                scale,
                offset: Vec2::new(0.0, (ch - ih * scale) * 0.5),
            }
        }
    }

    /// Image pixel space → canvas space.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Canvas-space rectangle covered by an image of size `image`.
    pub fn rect(&self, image: Size) -> Rect {
        Rect::from_origin_size(
            self.offset.to_point(),
            Size::new(image.width * self.scale, image.height * self.scale),
        )
    }
}

/// How a photo is placed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Aspect-fit, letterboxed; uncovered pixels stay transparent.
    Fit,
    /// Drawn through an alignment transform onto an opaque black canvas.
    Aligned(SimilarityTransform),
}

/// Renders photos into canvas-sized premultiplied RGBA8 frames.
///
/// Both placements go through the same draw call; they differ only in the image transform and
/// whether the canvas is cleared to black first. Drawing is clipped to the canvas.
pub struct FrameCompositor {
    canvas: Canvas,
    ctx: Option<vello_cpu::RenderContext>,
}

impl FrameCompositor {
    /// Create a compositor for a validated canvas.
    pub fn new(canvas: Canvas) -> LapseResult<Self> {
        canvas.validate()?;
        Ok(Self { canvas, ctx: None })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Aspect-fit `image` into the canvas without alignment.
    pub fn composite_fit(&mut self, image: &DecodedImage) -> LapseResult<FrameRGBA> {
        self.composite(image, Placement::Fit)
    }

    /// Draw `image` at native resolution through `transform` onto a black canvas.
    pub fn composite_aligned(
        &mut self,
        image: &DecodedImage,
        transform: &SimilarityTransform,
    ) -> LapseResult<FrameRGBA> {
        self.composite(image, Placement::Aligned(*transform))
    }

    /// Render `image` with the given placement.
    pub fn composite(
        &mut self,
        image: &DecodedImage,
        placement: Placement,
    ) -> LapseResult<FrameRGBA> {
        let (transform, clear_black) = match placement {
            Placement::Fit => (FitRect::compute(image.size(), self.canvas).to_affine(), false),
            Placement::Aligned(t) => (t.to_affine(), true),
        };
        if !transform.is_finite() || transform.determinant().abs() < f64::EPSILON {
            return Err(LapseError::frame("image transform is not invertible"));
        }

        let paint = image_paint(image)?;
        let mut frame = FrameRGBA::transparent(self.canvas)?;
        let (w, h) = canvas_dims_u16(self.canvas)?;
        let canvas_rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        let image_rect =
            vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if clear_black {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
                ctx.fill_rect(&canvas_rect);
            }
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&image_rect);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });

        frame.data.copy_from_slice(pixmap.data_as_u8_slice());
        Ok(frame)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }
}

fn canvas_dims_u16(canvas: Canvas) -> LapseResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| LapseError::frame("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| LapseError::frame("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(image: &DecodedImage) -> LapseResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> LapseResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LapseError::frame("photo width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LapseError::frame("photo height exceeds u16"))?;
    let px_count = (width as usize) * (height as usize);
    if bytes.len() != px_count.saturating_mul(4) {
        return Err(LapseError::frame("photo byte len mismatch"));
    }

    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::new();
    pixels.try_reserve_exact(px_count).map_err(|e| {
        LapseError::frame(format!("failed to allocate {width}x{height} photo surface: {e}"))
    })?;
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
