//! HTML sanitization with an allow-list.

use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Tags removed regardless of the caller's allow-list, contents included
pub const FORBIDDEN_TAGS: &[&str] = &[
    "script", "object", "embed", "iframe", "form", "input", "button", "style",
];

/// Tags allowed by default
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "em", "h1", "h2", "h3", "h4", "i", "li", "ol", "p",
    "pre", "span", "strong", "u", "ul",
];

/// Attributes allowed by default
pub const DEFAULT_ALLOWED_ATTRIBUTES: &[&str] = &["href", "title", "target"];

/// Allow-list for [`sanitize_html`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Tags kept in the output
    pub allowed_tags: HashSet<String>,
    /// Attributes kept on any allowed tag
    pub allowed_attributes: HashSet<String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            allowed_tags: DEFAULT_ALLOWED_TAGS.iter().map(|t| (*t).to_string()).collect(),
            allowed_attributes: DEFAULT_ALLOWED_ATTRIBUTES
                .iter()
                .map(|a| (*a).to_string())
                .collect(),
        }
    }
}

impl HtmlOptions {
    /// Allow only the given tags, with the default attributes
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Allow no markup at all
    pub fn text_only() -> Self {
        Self {
            allowed_tags: HashSet::new(),
            allowed_attributes: HashSet::new(),
        }
    }
}

fn is_forbidden_tag(tag: &str) -> bool {
    FORBIDDEN_TAGS.iter().any(|f| f.eq_ignore_ascii_case(tag))
}

fn is_forbidden_attribute(attr: &str) -> bool {
    let lower = attr.to_ascii_lowercase();
    // `rel` is owned by the cleaner's link policy
    lower.starts_with("on") || lower == "rel" || lower == "style"
}

/// Clean `input` down to the allow-list.
///
/// The forbidden tags and every `on*` attribute are removed even when the
/// caller allows them. A failure inside the cleaner yields an empty string.
pub fn sanitize_html(input: &str, options: &HtmlOptions) -> String {
    if input.is_empty() {
        return String::new();
    }

    let tags: HashSet<&str> = options
        .allowed_tags
        .iter()
        .map(String::as_str)
        .filter(|t| !is_forbidden_tag(t))
        .collect();
    let attributes: HashSet<&str> = options
        .allowed_attributes
        .iter()
        .map(String::as_str)
        .filter(|a| !is_forbidden_attribute(a))
        .collect();
    let clean_content: HashSet<&str> = FORBIDDEN_TAGS.iter().copied().collect();

    let cleaned = catch_unwind(AssertUnwindSafe(|| {
        ammonia::Builder::default()
            .tags(tags)
            .tag_attributes(HashMap::new())
            .generic_attributes(attributes)
            .clean_content_tags(clean_content)
            .clean(input)
            .to_string()
    }));

    match cleaned {
        Ok(html) => html,
        Err(_) => {
            tracing::warn!(
                input_length = input.len(),
                "HTML sanitizer failed, returning empty output"
            );
            String::new()
        },
    }
}
