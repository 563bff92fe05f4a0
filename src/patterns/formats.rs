//! Default validation regexes.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Email shape: local part, `@`, dotted domain with an alphabetic TLD
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$")
            .expect("email regex");

    /// Generic phone shape: optional `+`, digits and separators
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[0-9\s\-().]{7,20}$").expect("phone regex");

    /// ASCII letters and digits only
    pub static ref ALPHANUMERIC_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9]+$").expect("alphanumeric regex");

    /// http(s) URL
    pub static ref URL_REGEX: Regex =
        Regex::new(r"^https?://[a-zA-Z0-9](?:[a-zA-Z0-9.-]*[a-zA-Z0-9])?(?::[0-9]{1,5})?(?:[/?#][^\s]*)?$")
            .expect("url regex");

    /// Filename without path separators or leading dot
    pub static ref FILENAME_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,254}$").expect("filename regex");
}

/// Check email shape
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_REGEX.is_match(input)
}

/// Check generic phone shape
pub fn is_valid_phone(input: &str) -> bool {
    PHONE_REGEX.is_match(input)
}

/// Check ASCII alphanumeric
pub fn is_alphanumeric(input: &str) -> bool {
    ALPHANUMERIC_REGEX.is_match(input)
}

/// Check http(s) URL shape
pub fn is_valid_url(input: &str) -> bool {
    URL_REGEX.is_match(input)
}

/// Check filename is free of separators and traversal
pub fn is_safe_filename(input: &str) -> bool {
    FILENAME_REGEX.is_match(input) && !input.contains("..")
}
