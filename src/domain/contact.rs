//! Email and phone normalization. Both reject rather than mangle.

use crate::patterns::{is_valid_email, is_valid_phone};

/// Longest accepted email address
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Trim and lowercase an email, or `None` if it is not email-shaped
pub fn sanitize_email(input: &str) -> Option<String> {
    let email = input.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LENGTH || !is_valid_email(&email) {
        return None;
    }
    Some(email)
}

/// Normalize a North American number to `+1 (AAA) EEE-NNNN`.
///
/// Accepts 10 digits, or 11 with a leading country code `1`, written with
/// any mix of spaces, dashes, dots and parentheses. Anything else, including
/// letters or an area/exchange code starting with 0 or 1, yields `None`.
pub fn sanitize_phone(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !is_valid_phone(trimmed) {
        return None;
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return None,
    };

    let (area, rest) = national.split_at(3);
    let (exchange, line) = rest.split_at(3);
    if area.starts_with(['0', '1']) || exchange.starts_with(['0', '1']) {
        return None;
    }

    Some(format!("+1 ({area}) {exchange}-{line}"))
}
