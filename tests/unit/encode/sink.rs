use super::*;
use crate::foundation::core::Canvas;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::new(10, 1).unwrap(),
        bg_rgba: [0, 0, 0, 255],
    }
}

fn fast_poll(timeout_ms: u64) -> ReadyPoll {
    ReadyPoll {
        interval: Duration::from_millis(1),
        timeout: Duration::from_millis(timeout_ms),
    }
}

#[test]
fn presentation_time_is_index_over_fps() {
    let fps = Fps::new(24, 1).unwrap();
    let pts = PresentationTime {
        index: FrameIndex(48),
        fps,
    };
    assert!((pts.secs() - 2.0).abs() < 1e-12);
}

#[test]
fn default_wait_ready_polls_until_ready() {
    let mut sink = InMemorySink::new().with_busy_polls(3);
    sink.begin(&cfg()).unwrap();
    sink.wait_ready(&fast_poll(5_000)).unwrap();
    assert_eq!(sink.ready_checks(), 4);
}

#[test]
fn default_wait_ready_times_out() {
    let mut sink = InMemorySink::new().with_busy_polls(u32::MAX);
    sink.begin(&cfg()).unwrap();
    let err = sink.wait_ready(&fast_poll(20)).unwrap_err();
    assert!(matches!(err, LapseError::Encode(_)));
}

#[test]
fn in_memory_sink_captures_frames_and_status() {
    let mut sink = InMemorySink::new().with_final_status(SinkStatus::Failed("disk".into()));
    let frame = FrameRGBA::transparent(Canvas::new(4, 2)).unwrap();
    let pts = PresentationTime {
        index: FrameIndex(0),
        fps: cfg().fps,
    };
    assert!(sink.push_frame(pts, &frame).is_err());

    sink.begin(&cfg()).unwrap();
    sink.push_frame(pts, &frame).unwrap();
    assert_eq!(sink.frames().len(), 1);
    assert_eq!(sink.config().unwrap().width, 4);
    assert_eq!(sink.end().unwrap(), SinkStatus::Failed("disk".into()));
    assert!(sink.was_ended());
}
