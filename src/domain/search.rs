//! Search box sanitizer.

use crate::sanitizer::sanitize_input;

/// Longest accepted search query
pub const MAX_QUERY_LENGTH: usize = 100;

fn is_query_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.')
}

/// Reduce a search query to ASCII letters, digits, spaces, hyphens,
/// apostrophes and dots, with whitespace collapsed
pub fn sanitize_search_query(input: &str) -> String {
    let cleaned = sanitize_input(input, MAX_QUERY_LENGTH);
    let filtered: String = cleaned
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|&c| is_query_char(c))
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert_eq!(sanitize_search_query("test @#$ 世界 query"), "test query");
        assert_eq!(sanitize_search_query("o'neil's 2.5-inch"), "o'neil's 2.5-inch");
    }

    #[test]
    fn test_whitespace_normalized() {
        assert_eq!(sanitize_search_query("\t red\n\nshoes  "), "red shoes");
        assert_eq!(sanitize_search_query("   "), "");
    }

    #[test]
    fn test_markup_removed_first() {
        assert_eq!(
            sanitize_search_query("<script>alert(1)</script>boots"),
            "boots"
        );
    }

    #[test]
    fn test_length_capped() {
        let long = "a".repeat(500);
        assert_eq!(sanitize_search_query(&long).len(), MAX_QUERY_LENGTH);
    }
}
