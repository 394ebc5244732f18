use std::sync::mpsc::channel;

use super::*;

#[test]
fn reports_are_clamped_and_monotonic() {
    let (tx, rx) = channel();
    let mut p = ProgressReporter::new(tx);
    p.report(-0.5);
    p.report(0.5);
    p.report(0.25);
    p.report(f64::NAN);
    p.report(2.0);
    drop(p);
    let got: Vec<f64> = rx.iter().collect();
    assert_eq!(got, vec![0.0, 0.5, 1.0]);
}

#[test]
fn finish_at_one_only_emits_when_needed() {
    let (tx, rx) = channel();
    let mut p = ProgressReporter::new(tx);
    p.report(0.5);
    p.finish_at_one();
    p.finish_at_one();
    assert_eq!(p.last(), Some(1.0));
    drop(p);
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![0.5, 1.0]);
}

#[test]
fn dropped_receiver_is_ignored() {
    let (tx, rx) = channel();
    drop(rx);
    let mut p = ProgressReporter::new(tx);
    p.report(0.3);
    p.report(0.6);
    assert_eq!(p.last(), Some(0.6));
}

#[test]
fn disabled_reporter_still_tracks_last_value() {
    let mut p = ProgressReporter::disabled();
    p.report(0.4);
    assert_eq!(p.last(), Some(0.4));
}

#[test]
fn cancel_flag_is_shared_between_clones() {
    let flag = CancelFlag::new();
    let other = flag.clone();
    assert!(!other.is_cancelled());
    flag.cancel();
    assert!(other.is_cancelled());
}
