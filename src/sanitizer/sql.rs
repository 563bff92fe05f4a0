//! SQL-flavored sanitization.

use lazy_static::lazy_static;
use regex::Regex;

use crate::patterns::{KEYWORD_REGEX, SPECIAL_CHAR_REGEX};

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace regex");
}

/// Strip special characters, then whole-word SQL keywords, then normalize
/// whitespace.
///
/// Passes repeat until the output is stable, so fragments that only become
/// dangerous after a removal (`-SELECT-` turning into `--`) are also caught.
/// Each repeated pass strictly shortens the string, so this terminates.
pub fn sanitize_sql(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut current = sanitize_pass(input);
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_pass(input: &str) -> String {
    let stripped = SPECIAL_CHAR_REGEX.replace_all(input, "");
    let without_keywords = KEYWORD_REGEX.replace_all(&stripped, "");
    WHITESPACE_RUN
        .replace_all(&without_keywords, " ")
        .trim()
        .to_string()
}

/// Lossless escape for diagnostic output.
///
/// Quotes are doubled; backslash, terminator, `#` and comment markers are
/// backslash-escaped; NUL becomes `\0`. Never feed the result to a query
/// builder.
pub fn escape_sql(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => out.push_str("''"),
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            '#' => out.push_str("\\#"),
            '\0' => out.push_str("\\0"),
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                out.push_str("\\-\\-");
            },
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("\\/\\*");
            },
            '*' if chars.peek() == Some(&'/') => {
                chars.next();
                out.push_str("\\*\\/");
            },
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_injection() {
        assert_eq!(
            sanitize_sql("1' UNION SELECT password FROM users --"),
            "1 password users"
        );
    }

    #[test]
    fn test_keyword_behind_broken_comment() {
        // Stripping `/*` first exposes SELECT as a whole word
        assert_eq!(sanitize_sql("SEL/**/ECT name"), "name");
    }

    #[test]
    fn test_removal_exposing_comment_marker() {
        let out = sanitize_sql("a -SELECT- b");
        assert!(!out.contains("--"));
        assert_eq!(out, "a b");
    }

    #[test]
    fn test_benign_identifier_untouched() {
        assert_eq!(sanitize_sql("blue_widget 42"), "blue_widget 42");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(sanitize_sql("  a \t\n b  "), "a b");
        assert_eq!(sanitize_sql(""), "");
    }

    #[test]
    fn test_escape_quotes_and_markers() {
        assert_eq!(escape_sql("O'Brien"), "O''Brien");
        assert_eq!(escape_sql("x; --y"), "x\\; \\-\\-y");
        assert_eq!(escape_sql("/*c*/"), "\\/\\*c\\*\\/");
        assert_eq!(escape_sql("a-b"), "a-b");
    }
}
