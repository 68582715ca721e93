// Report window resolution: exact spans, UTC, fail-closed parsing

mod common;

use chrono::Duration;
use cloud_insights::error::ReportError;
use cloud_insights::window::{Frequency, resolve, resolve_label};

#[test]
fn resolve_ends_at_now_with_exact_spans() {
    let now = common::fixed_now();
    for (frequency, days) in [
        (Frequency::Daily, 1),
        (Frequency::Weekly, 7),
        (Frequency::Monthly, 30),
    ] {
        let window = resolve(frequency, now);
        assert_eq!(window.end, now);
        assert!(window.start < window.end);
        assert_eq!(window.end - window.start, Duration::days(days));
    }
}

#[test]
fn resolve_label_accepts_known_labels() {
    let now = common::fixed_now();
    let window = resolve_label("weekly", now).unwrap();
    assert_eq!(window.duration(), Duration::days(7));
}

#[test]
fn unknown_frequency_fails_closed() {
    let now = common::fixed_now();
    for label in ["yearly", "Daily", "", " weekly"] {
        match resolve_label(label, now) {
            Err(ReportError::InvalidFrequency(got)) => assert_eq!(got, label),
            other => panic!("expected InvalidFrequency for {label:?}, got {other:?}"),
        }
    }
}

#[test]
fn frequency_labels() {
    assert_eq!(Frequency::Monthly.label(), "Monthly");
    assert_eq!(Frequency::Daily.to_string(), "daily");
    assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
}

#[test]
fn window_contains_is_half_open() {
    let now = common::fixed_now();
    let window = resolve(Frequency::Daily, now);
    assert!(window.contains(window.start));
    assert!(!window.contains(window.end));
}
