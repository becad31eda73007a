use std::sync::mpsc;

use super::*;

#[test]
fn cancel_is_shared_between_clones() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(!b.is_cancelled());
    a.cancel();
    assert!(b.is_cancelled());
}

#[test]
fn percent_follows_phases() {
    let (tx, rx) = mpsc::channel();
    let mut r = ProgressReporter::new(Some(&tx));
    r.report(ExportPhase::Preparing, 0, 4);
    for i in 1..=4 {
        r.report(ExportPhase::Rendering, i, 4);
    }
    r.report(ExportPhase::Finalizing, 4, 4);
    r.report(ExportPhase::Complete, 4, 4);
    drop(tx);

    let percents: Vec<f64> = rx.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![0.0, 25.0, 50.0, 75.0, 100.0, 100.0, 100.0]);
}

#[test]
fn percent_never_decreases() {
    let (tx, rx) = mpsc::channel();
    let mut r = ProgressReporter::new(Some(&tx));
    r.report(ExportPhase::Rendering, 3, 4);
    r.report(ExportPhase::Preparing, 0, 4);
    drop(tx);
    let last = rx.iter().last().unwrap();
    assert_eq!(last.phase, ExportPhase::Preparing);
    assert_eq!(last.percent, 75.0);
}

#[test]
fn reporting_without_listener_is_fine() {
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut r = ProgressReporter::new(Some(&tx));
    r.report(ExportPhase::Rendering, 1, 2);
    ProgressReporter::new(None).report(ExportPhase::Complete, 2, 2);
}
