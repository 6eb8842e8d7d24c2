use super::*;

#[test]
fn toast_is_visible_for_three_seconds() {
    let mut notifier = Notifier::new();
    let start = Instant::now();
    notifier.show_at("2 PDF file(s) selected", ToastKind::Success, start);

    let visible = notifier
        .visible(start + Duration::from_millis(2_999))
        .expect("still visible");
    assert_eq!(visible.message, "2 PDF file(s) selected");
    assert_eq!(visible.kind, ToastKind::Success);

    assert!(notifier.visible(start + TOAST_TTL).is_none());
}

#[test]
fn new_toast_replaces_and_restarts_window() {
    let mut notifier = Notifier::new();
    let start = Instant::now();
    notifier.show_at("first", ToastKind::Success, start);
    notifier.show_at("second", ToastKind::Error, start + Duration::from_secs(2));

    let at_four = start + Duration::from_secs(4);
    let visible = notifier.visible(at_four).expect("second still visible");
    assert_eq!(visible.message, "second");
    assert_eq!(visible.kind, ToastKind::Error);

    assert!(notifier.visible(start + Duration::from_secs(5)).is_none());
}

#[test]
fn stale_expiry_does_not_clear_newer_toast() {
    let mut notifier = Notifier::new();
    let first = notifier.success("first");
    let second = notifier.error("second");
    assert_ne!(first, second);

    assert!(!notifier.expire(first));
    assert_eq!(
        notifier.current().map(|toast| toast.message.as_str()),
        Some("second")
    );

    assert!(notifier.expire(second));
    assert!(notifier.current().is_none());
}

#[test]
fn prune_drops_elapsed_toast() {
    let mut notifier = Notifier::with_ttl(Duration::from_millis(10));
    let start = Instant::now();
    notifier.show_at("short", ToastKind::Success, start);

    notifier.prune(start + Duration::from_millis(5));
    assert!(notifier.visible(start + Duration::from_millis(5)).is_some());

    notifier.prune(start + Duration::from_millis(10));
    assert!(notifier.visible(start).is_none());
}

#[test]
fn remaining_reports_time_until_expiry() {
    let mut notifier = Notifier::new();
    let start = Instant::now();
    assert_eq!(notifier.remaining(start), None);

    notifier.show_at("hello", ToastKind::Success, start);
    assert_eq!(
        notifier.remaining(start + Duration::from_secs(1)),
        Some(Duration::from_secs(2))
    );
    assert_eq!(notifier.remaining(start + Duration::from_secs(3)), None);
}
