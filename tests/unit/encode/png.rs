use super::*;
use crate::foundation::core::{Canvas, Fps, FrameIndex};

#[test]
fn writes_one_png_per_frame_flattened_over_background() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("target/unit_png_sink");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir);
    let fps = Fps::new(10, 1).unwrap();
    sink.begin(&SinkConfig {
        width: 4,
        height: 2,
        fps,
        bg_rgba: [10, 20, 30, 255],
    })
    .unwrap();

    let frame = FrameRGBA::transparent(Canvas::new(4, 2)).unwrap();
    for i in 0..2 {
        let pts = PresentationTime {
            index: FrameIndex(i),
            fps,
        };
        assert!(sink.is_ready());
        sink.push_frame(pts, &frame).unwrap();
    }
    assert_eq!(sink.end().unwrap(), SinkStatus::Completed);
    assert_eq!(sink.written(), 2);

    let img = image::open(sink.frame_path(1)).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [10, 20, 30, 255]);
    assert!(dir.join("frame_000000.png").exists());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new("target/unit_png_unused");
    let frame = FrameRGBA::transparent(Canvas::new(2, 2)).unwrap();
    let pts = PresentationTime {
        index: FrameIndex(0),
        fps: Fps::new(30, 1).unwrap(),
    };
    assert!(!sink.is_ready());
    assert!(sink.push_frame(pts, &frame).is_err());
}
