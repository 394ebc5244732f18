use super::*;
use crate::foundation::core::Point;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn assert_px(frame: &FrameRGBA, x: u32, y: u32, expected: [u8; 4]) {
    let px = frame.pixel(x, y).unwrap();
    for (got, want) in px.iter().zip(expected) {
        assert!(
            (i16::from(*got) - i16::from(want)).abs() <= 3,
            "pixel ({x},{y}) = {px:?}, expected {expected:?}"
        );
    }
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
    let data = rgba
        .iter()
        .copied()
        .cycle()
        .take((w * h * 4) as usize)
        .collect();
    DecodedImage::from_rgba8(w, h, data).unwrap()
}

#[test]
fn fit_rect_pillarboxes_tall_images() {
    let fit = FitRect::compute(Size::new(900.0, 1600.0), Canvas::new(1920, 1080));
    assert!((fit.scale - 1080.0 / 1600.0).abs() < 1e-12);
    let r = fit.rect(Size::new(900.0, 1600.0));
    assert!(r.y0.abs() < 1e-9 && (r.y1 - 1080.0).abs() < 1e-9);
    assert!(((r.x0 + r.x1) * 0.5 - 960.0).abs() < 1e-9);
}

#[test]
fn fit_rect_letterboxes_wide_images() {
    let fit = FitRect::compute(Size::new(4000.0, 1000.0), Canvas::new(1920, 1080));
    assert!((fit.scale - 1920.0 / 4000.0).abs() < 1e-12);
    let r = fit.rect(Size::new(4000.0, 1000.0));
    assert!(r.x0.abs() < 1e-9 && (r.x1 - 1920.0).abs() < 1e-9);
    assert!(((r.y0 + r.y1) * 0.5 - 540.0).abs() < 1e-9);
    assert!(r.y0 > 0.0);
}

#[test]
fn fit_rect_affine_matches_rect() {
    let img = Size::new(40.0, 30.0);
    let fit = FitRect::compute(img, Canvas::new(64, 36));
    let a = fit.to_affine();
    let r = fit.rect(img);
    assert!(((a * Point::ORIGIN) - Point::new(r.x0, r.y0)).hypot() < 1e-9);
    assert!(((a * Point::new(40.0, 30.0)) - Point::new(r.x1, r.y1)).hypot() < 1e-9);
}

#[test]
fn fit_output_is_always_canvas_sized() {
    let canvas = Canvas::new(1920, 1080);
    let mut comp = FrameCompositor::new(canvas).unwrap();
    for (w, h) in [(40, 30), (90, 160), (16, 9), (7, 7)] {
        let frame = comp.composite_fit(&solid(w, h, RED)).unwrap();
        assert!(frame.matches(canvas), "{w}x{h} produced wrong frame size");
    }
}

#[test]
fn fit_leaves_letterbox_transparent() {
    let canvas = Canvas::new(64, 36);
    let mut comp = FrameCompositor::new(canvas).unwrap();
    // 9:16 photo on a 16:9 canvas: bars on the left and right.
    let frame = comp.composite_fit(&solid(18, 32, RED)).unwrap();
    assert_px(&frame, 32, 18, RED);
    assert_eq!(frame.pixel(1, 18).unwrap()[3], 0);
    assert_eq!(frame.pixel(62, 18).unwrap()[3], 0);
}

#[test]
fn aligned_fills_uncovered_canvas_black() {
    let canvas = Canvas::new(64, 36);
    let mut comp = FrameCompositor::new(canvas).unwrap();
    let t = SimilarityTransform {
        rotation: 0.0,
        scale: 1.0,
        translation: Vec2::new(4.0, 4.0),
    };
    let frame = comp.composite_aligned(&solid(10, 10, RED), &t).unwrap();
    assert!(frame.matches(canvas));
    assert_px(&frame, 9, 9, RED);
    assert_px(&frame, 40, 20, BLACK);
    assert_px(&frame, 0, 0, BLACK);
    assert_px(&frame, 63, 35, BLACK);
}

#[test]
fn aligned_rotation_exposes_black_corners() {
    let canvas = Canvas::new(64, 36);
    let mut comp = FrameCompositor::new(canvas).unwrap();
    let img = solid(64, 36, RED);
    // Rotate 45 degrees about the canvas center.
    let center = Vec2::new(32.0, 18.0);
    let r = Affine::translate(center) * Affine::rotate(std::f64::consts::FRAC_PI_4);
    let translation = (r * Affine::translate(-center)).translation();
    let t = SimilarityTransform {
        rotation: std::f64::consts::FRAC_PI_4,
        scale: 1.0,
        translation,
    };
    let frame = comp.composite_aligned(&img, &t).unwrap();
    assert_px(&frame, 32, 18, RED);
    assert_px(&frame, 0, 0, BLACK);
    assert_px(&frame, 63, 35, BLACK);
}

#[test]
fn aligned_clips_images_larger_than_canvas() {
    let canvas = Canvas::new(32, 18);
    let mut comp = FrameCompositor::new(canvas).unwrap();
    let frame = comp
        .composite_aligned(&solid(200, 200, RED), &SimilarityTransform::IDENTITY)
        .unwrap();
    assert!(frame.matches(canvas));
    assert_px(&frame, 16, 9, RED);
}

#[test]
fn degenerate_transform_is_a_frame_error() {
    let mut comp = FrameCompositor::new(Canvas::new(32, 18)).unwrap();
    let t = SimilarityTransform {
        rotation: 0.0,
        scale: 0.0,
        translation: Vec2::ZERO,
    };
    let err = comp.composite_aligned(&solid(4, 4, RED), &t).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn invalid_canvas_is_rejected() {
    assert!(FrameCompositor::new(Canvas::new(31, 18)).is_err());
}
