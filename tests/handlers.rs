//! Protected handler tests across presets, observers and typed forms.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use shield::{
    create_protected_form_handler, InputChange, InputGuard, MultiValidationResult,
    ProtectionOptions, RiskLevel, SecurityPreset, ThreatEvent, ThreatHistory,
};

fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Strict preset holds the whole submission back
#[test]
fn test_strict_form_blocked() {
    let submitted = Arc::new(Mutex::new(Vec::new()));
    let sink = submitted.clone();
    let mut submit = create_protected_form_handler(
        move |fields: BTreeMap<String, String>, _: &MultiValidationResult| {
            sink.lock().unwrap().push(fields);
        },
        ProtectionOptions::preset(SecurityPreset::Strict),
    );

    let outcome = submit(form(&[
        ("search", "shoes"),
        ("coupon", "X'; DROP TABLE coupons; --"),
    ]));

    assert!(outcome.is_blocked());
    assert!(submitted.lock().unwrap().is_empty());

    let report = outcome.report();
    assert!(report.has_threats);
    assert_eq!(report.summary.overall, RiskLevel::High);
    assert_eq!(report.summary.high, 1);
    assert_eq!(report.summary.none, 1);
    assert_eq!(report.invalid_fields(), vec!["coupon"]);
}

/// Moderate preset forwards sanitized values with the report
#[test]
fn test_moderate_form_sanitized() {
    let mut submit = create_protected_form_handler(
        |fields: BTreeMap<String, String>, report: &MultiValidationResult| {
            (fields, report.has_threats)
        },
        ProtectionOptions::preset(SecurityPreset::Moderate),
    );

    let outcome = submit(form(&[
        ("name", "Jane"),
        ("note", "hi' OR 'a'='a"),
    ]));
    assert!(!outcome.is_blocked());

    let (fields, had_threats) = outcome.output().unwrap();
    assert!(had_threats);
    assert_eq!(fields["name"], "Jane");
    assert_eq!(fields["note"], "hi a=a");
}

/// Observers see every unsafe value with its field name
#[test]
fn test_change_handler_reports_to_observer() {
    let seen: Arc<Mutex<Vec<ThreatEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let guard = InputGuard::default().with_observer(Arc::new(move |event: &ThreatEvent| {
        sink.lock().unwrap().push(event.clone());
    }));

    let mut on_change = guard.protected_change_handler(|change, inspection| {
        (change.value, inspection.detection.risk_level)
    });

    let (value, risk) = on_change(InputChange::new("email", "a@b.co"));
    assert_eq!(value, "a@b.co");
    assert_eq!(risk, RiskLevel::None);

    let (value, risk) = on_change(InputChange::new("email", "x@y.z' OR 1=1"));
    assert_eq!(risk, RiskLevel::High);
    assert!(!value.contains('\''));

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field.as_deref(), Some("email"));
    assert_eq!(events[0].risk_level, RiskLevel::High);
}

/// A shared history collects events from several guards
#[test]
fn test_shared_history_across_guards() {
    let history = Arc::new(ThreatHistory::new(3));
    let strict = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Strict))
        .with_observer(history.clone());
    let lenient = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Lenient))
        .with_observer(history.clone());

    let mut set_a = strict.protected_setter(|_| {});
    let mut set_b = lenient.protected_setter(|_| {});

    set_a("1; DROP TABLE x");
    set_b("it's");
    set_a("plain");
    set_b("SLEEP(5)");
    set_a("UNION SELECT 1");

    assert_eq!(history.len(), 3);
    let recent = history.recent(3);
    assert!(recent[0].input_preview.starts_with("UNION"));

    let summary = history.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.high, 2);
    assert_eq!(summary.medium, 1);
}

/// Lenient preset leaves markup stripping to the caller
#[test]
fn test_lenient_keeps_markup() {
    let guard = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Lenient));
    let inspection = guard.inspect(None, "<b>bold</b>");
    assert_eq!(inspection.value, "<b>bold</b>");
    assert!(inspection.is_valid());
}
