use super::*;

#[test]
fn empty_json_yields_defaults() {
    let cfg = ExportConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ExportConfig::default());
    assert_eq!(cfg.canvas, Canvas::new(1920, 1080));
    assert_eq!(cfg.fps, 30);
    assert!(cfg.align);
    assert_eq!(cfg.ready_poll(), ReadyPoll::default());
}

#[test]
fn partial_json_overrides_fields() {
    let cfg = ExportConfig::from_json_str(
        r#"{"canvas":{"width":640,"height":480},"fps":10,"align":false,"backpressure":{"timeout_ms":100}}"#,
    )
    .unwrap();
    assert_eq!(cfg.canvas, Canvas::new(640, 480));
    assert!(!cfg.align);
    assert_eq!(cfg.backpressure.poll_interval_ms, 5);
    assert_eq!(cfg.backpressure.timeout_ms, 100);

    let sink = cfg.sink_config().unwrap();
    assert_eq!((sink.width, sink.height), (640, 480));
    assert_eq!(sink.fps, Fps::new(10, 1).unwrap());
}

#[test]
fn rejects_fps_outside_menu() {
    let err = ExportConfig::from_json_str(r#"{"fps":25}"#).unwrap_err();
    assert!(matches!(err, LapseError::Validation(_)));
}

#[test]
fn rejects_odd_canvas() {
    let cfg = ExportConfig {
        canvas: Canvas::new(641, 480),
        ..ExportConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_zero_poll_interval() {
    let mut cfg = ExportConfig::default();
    cfg.backpressure.poll_interval_ms = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ExportConfig::from_json_str("{fps:").unwrap_err();
    assert!(matches!(err, LapseError::Serde(_)));
}
