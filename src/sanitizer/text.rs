//! Plain-text escaping and the general-purpose field sanitizer.

use lazy_static::lazy_static;
use regex::Regex;

/// Default length cap for [`sanitize_input`]
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 1000;

lazy_static! {
    static ref CONTROL_CHARS: Regex =
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control char regex");
    static ref SCRIPT_BLOCK: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block regex");
    static ref SCRIPT_TAG: Regex =
        Regex::new(r"(?i)</?script\b[^>]*>").expect("script tag regex");
    static ref DANGEROUS_SCHEME: Regex =
        Regex::new(r"(?i)(?:javascript|vbscript|data)\s*:").expect("scheme regex");
    static ref EVENT_HANDLER: Regex =
        Regex::new(r"(?i)\bon\w+\s*=").expect("event handler regex");
    static ref SPACE_RUN: Regex = Regex::new(r"[ \t]{2,}").expect("space run regex");
}

/// Escape text so no markup in it can be interpreted
pub fn sanitize_text(input: &str) -> String {
    html_escape::encode_text(input).into_owned()
}

/// General-purpose field cleaner.
///
/// Removes control characters, `<script>` blocks and stray script tags,
/// `javascript:`/`vbscript:`/`data:` schemes and inline `on*=` handlers,
/// collapses runs of spaces, trims, and truncates to `max_length`
/// characters.
pub fn sanitize_input(input: &str, max_length: usize) -> String {
    if input.is_empty() || max_length == 0 {
        return String::new();
    }

    let stripped = strip_markup(input);
    let collapsed = SPACE_RUN.replace_all(&stripped, " ");
    let truncated: String = collapsed.trim().chars().take(max_length).collect();
    truncated.trim_end().to_string()
}

/// Remove control characters, script blocks, dangerous schemes and inline
/// handlers, leaving whitespace and length alone.
///
/// Repeats until stable so removals cannot reassemble a dangerous token.
pub fn strip_markup(input: &str) -> String {
    let mut current = strip_dangerous(input);
    loop {
        let next = strip_dangerous(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// [`sanitize_input`] with the default length cap
pub fn sanitize_input_default(input: &str) -> String {
    sanitize_input(input, DEFAULT_MAX_INPUT_LENGTH)
}

fn strip_dangerous(input: &str) -> String {
    let s = CONTROL_CHARS.replace_all(input, "");
    let s = SCRIPT_BLOCK.replace_all(&s, "");
    let s = SCRIPT_TAG.replace_all(&s, "");
    let s = DANGEROUS_SCHEME.replace_all(&s, "");
    EVENT_HANDLER.replace_all(&s, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_block_removed() {
        assert_eq!(
            sanitize_input_default(r#"Hello <script>alert("xss")</script> World"#),
            "Hello World"
        );
    }

    #[test]
    fn test_nested_script_reassembly() {
        let out = sanitize_input_default("<scr<script></script>ipt>alert(1)</script>ok");
        assert!(!out.to_lowercase().contains("<script"));
        assert!(out.ends_with("ok"));
    }

    #[test]
    fn test_schemes_and_handlers() {
        assert_eq!(sanitize_input_default("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input_default("<img src=x onerror=alert(1)>"), "<img src=x alert(1)>");
        assert_eq!(sanitize_input_default("xjavascript:alert(1)"), "xalert(1)");
        assert_eq!(sanitize_input_default("metadata: x"), "meta x");
    }

    #[test]
    fn test_control_chars() {
        assert_eq!(sanitize_input_default("a\u{0}b\u{7f}c\td"), "abc\td");
        assert_eq!(sanitize_input_default("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn test_truncation() {
        assert_eq!(sanitize_input("abcdef", 3), "abc");
        assert_eq!(sanitize_input("ab cd", 3), "ab");
        assert_eq!(sanitize_input("anything", 0), "");
        assert_eq!(sanitize_input("привет мир", 6).chars().count(), 6);
    }

    #[test]
    fn test_strip_markup_keeps_spacing() {
        assert_eq!(strip_markup("typing  <script>x</script> "), "typing   ");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
        assert_eq!(sanitize_text("plain"), "plain");
    }
}
