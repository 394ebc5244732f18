use super::*;
use crate::foundation::core::{Canvas, Point, Size};

fn anchor(x: f64) -> CanvasEyeReference {
    CanvasEyeReference {
        left: Point::new(x, 10.0),
        right: Point::new(x + 50.0, 10.0),
    }
}

#[test]
fn establish_is_set_once() {
    let r = EyeReference::default();
    assert!(!r.is_established());
    assert_eq!(r.get(), None);

    let r = r.establish(anchor(1.0));
    assert_eq!(r.get(), Some(&anchor(1.0)));

    let r = r.establish(anchor(99.0));
    assert_eq!(r.get(), Some(&anchor(1.0)));
    assert_eq!(r.get(), r.get());
}

#[test]
fn reference_follows_fit_geometry() {
    // 800x600 photo on a 1600x900 canvas: scale 1.5, pillarbox offset 200.
    let canvas = Canvas::new(1600, 900);
    let size = Size::new(800.0, 600.0);
    let fit = FitRect::compute(size, canvas);
    let eyes = EyeLocations {
        left_eye: Point::new(300.0, 400.0),
        right_eye: Point::new(500.0, 400.0),
        image_size: size,
    };

    let r = reference_from_fit(&eyes, &fit);
    // Bottom-left y=400 is top-left y=200, scaled to 300.
    assert!((r.left - Point::new(200.0 + 450.0, 300.0)).hypot() < 1e-9);
    assert!((r.right - Point::new(200.0 + 750.0, 300.0)).hypot() < 1e-9);
}
