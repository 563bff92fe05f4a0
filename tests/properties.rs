//! Property tests for the sanitizer guarantees.

use proptest::prelude::*;
use shield::{
    detect, sanitize_input, sanitize_sql, sanitize_user_input, RiskLevel, UserRegistration,
};

const FRAGMENTS: &[&str] = &[
    "'", "\"", "--", "-", "/*", ";", "%27", " ", "SELECT", "union", "Or", "1=1", "sleep(",
    "<script>", "\u{1a}",
];

/// Strings biased toward SQL and markup fragments
fn hostile_string() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        prop::sample::select(FRAGMENTS).prop_map(str::to_string),
        "[a-zA-Z0-9 ]{0,6}",
        any::<char>().prop_map(|c| c.to_string()),
    ];
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn sanitize_sql_is_idempotent(s in hostile_string()) {
        let once = sanitize_sql(&s);
        prop_assert_eq!(sanitize_sql(&once), once);
    }

    #[test]
    fn sanitized_sql_scans_at_most_low(s in hostile_string()) {
        let cleaned = sanitize_sql(&s);
        let result = detect(&cleaned);
        prop_assert!(
            result.risk_level.is_at_most(RiskLevel::Low),
            "{:?} -> {:?} scanned {}", s, cleaned, result.risk_level
        );
    }

    #[test]
    fn sanitize_input_respects_cap(s in any::<String>(), n in 0usize..64) {
        prop_assert!(sanitize_input(&s, n).chars().count() <= n);
    }

    #[test]
    fn password_passes_through(p in any::<String>(), name in hostile_string()) {
        let user = UserRegistration {
            name,
            email: "a@b.co".to_string(),
            password: p.clone(),
            phone: None,
        };
        prop_assert_eq!(sanitize_user_input(&user).password, p);
    }
}
