use std::time::Duration;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Fps};

fn cfg(fps: u32) -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        fps: Fps::from_menu(fps).unwrap(),
        bg_rgba: [0, 0, 0, 255],
    }
}

fn poll() -> ReadyPoll {
    ReadyPoll {
        interval: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA::transparent(Canvas::new(4, 2)).unwrap()
}

#[test]
fn appends_advance_presentation_time_by_one_frame() {
    let mut sink = InMemorySink::new().with_output_path("out.mp4");
    {
        let mut session = EncodeSession::open(&mut sink, cfg(10), poll()).unwrap();
        assert_eq!(session.status(), EncodeStatus::Writing);
        for i in 0..3u64 {
            let pts = session.append_frame(&frame()).unwrap();
            assert_eq!(pts.index, FrameIndex(i));
        }
        let out = session.finish().unwrap();
        assert_eq!(session.status(), EncodeStatus::Finished);
        assert_eq!(out.frames, 3);
        assert!((out.duration_secs - 0.3).abs() < 1e-12);
        assert_eq!(out.path, Some(PathBuf::from("out.mp4")));
    }
    let secs: Vec<f64> = sink.frames().iter().map(|(p, _)| p.secs()).collect();
    assert_eq!(secs.len(), 3);
    for (got, want) in secs.iter().zip([0.0, 0.1, 0.2]) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn append_waits_for_readiness() {
    let mut sink = InMemorySink::new().with_busy_polls(2);
    {
        let mut session = EncodeSession::open(&mut sink, cfg(30), poll()).unwrap();
        session.append_frame(&frame()).unwrap();
        session.append_frame(&frame()).unwrap();
        session.finish().unwrap();
    }
    // Two refusals plus one acceptance per frame.
    assert_eq!(sink.ready_checks(), 6);
    assert_eq!(sink.frames().len(), 2);
}

#[test]
fn readiness_timeout_fails_the_session() {
    let mut sink = InMemorySink::new().with_busy_polls(u32::MAX);
    {
        let quick = ReadyPoll {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(10),
        };
        let mut session = EncodeSession::open(&mut sink, cfg(30), quick).unwrap();
        assert!(session.append_frame(&frame()).is_err());
        assert_eq!(session.status(), EncodeStatus::Failed);
        assert_eq!(session.frames_appended(), 0);
        assert!(session.finish().is_err());
    }
    assert!(sink.was_aborted());
}

#[test]
fn open_failure_is_reported() {
    let mut sink = InMemorySink::new().failing_begin();
    assert!(EncodeSession::open(&mut sink, cfg(30), poll()).is_err());
}

#[test]
fn non_completed_final_status_is_an_error() {
    let mut sink = InMemorySink::new().with_final_status(SinkStatus::Failed("moov atom".into()));
    let mut session = EncodeSession::open(&mut sink, cfg(30), poll()).unwrap();
    session.append_frame(&frame()).unwrap();
    let err = session.finish().unwrap_err();
    assert!(err.to_string().contains("moov atom"));
    assert_eq!(session.status(), EncodeStatus::Failed);
}

#[test]
fn wrong_frame_size_does_not_touch_the_session() {
    let mut sink = InMemorySink::new();
    let mut session = EncodeSession::open(&mut sink, cfg(30), poll()).unwrap();
    let small = FrameRGBA::transparent(Canvas::new(2, 2)).unwrap();
    assert!(session.append_frame(&small).unwrap_err().is_recoverable());
    assert_eq!(session.status(), EncodeStatus::Writing);
    assert_eq!(session.next_presentation_time().index, FrameIndex(0));
}

#[test]
fn dropping_a_writing_session_aborts_the_sink() {
    let mut sink = InMemorySink::new();
    {
        let mut session = EncodeSession::open(&mut sink, cfg(30), poll()).unwrap();
        session.append_frame(&frame()).unwrap();
    }
    assert!(sink.was_aborted());
    assert!(!sink.was_ended());
}

#[test]
fn abort_after_finish_is_a_no_op() {
    let mut sink = InMemorySink::new();
    {
        let mut session = EncodeSession::open(&mut sink, cfg(30), poll()).unwrap();
        session.finish().unwrap();
        session.abort();
        assert_eq!(session.status(), EncodeStatus::Finished);
    }
    assert!(!sink.was_aborted());
}
