use super::*;

#[test]
fn fps_menu_accepts_only_listed_rates() {
    for fps in Fps::MENU {
        let f = Fps::from_menu(fps).unwrap();
        assert_eq!(f.num, fps);
        assert_eq!(f.den, 1);
    }
    assert!(Fps::from_menu(0).is_err());
    assert!(Fps::from_menu(25).is_err());
    assert!(Fps::from_menu(120).is_err());
}

#[test]
fn fps_timing_helpers() {
    let f = Fps::new(30, 1).unwrap();
    assert!((f.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert!((f.frames_to_secs(90) - 3.0).abs() < 1e-12);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_validation() {
    assert!(Canvas::default().validate().is_ok());
    assert!(Canvas::new(0, 10).validate().is_err());
    assert!(Canvas::new(11, 10).validate().is_err());
    assert!(Canvas::new(70_000, 10).validate().is_err());
    assert_eq!(Canvas::new(4, 2).rgba_len(), 32);
    assert!((Canvas::new(1920, 1080).aspect() - 16.0 / 9.0).abs() < 1e-12);
}

#[test]
fn premul_rgba8_scales_channels() {
    assert_eq!(premul_rgba8([255, 0, 0, 128]), [128, 0, 0, 128]);
    assert_eq!(premul_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
}
