//! SQL keyword groups and special-character tables.
//!
//! Every keyword that a `medium` or `high` detection pattern keys on must
//! appear in one of these groups, and every character a pattern needs must
//! appear in [`SPECIAL_CHARS`]. The SQL sanitizer strips both, which is what
//! keeps sanitized output below `medium` risk.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

/// Data manipulation statements
pub static DML_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "REPLACE", "UPSERT", "EXEC", "EXECUTE",
];

/// Data definition statements and object nouns
pub static DDL_KEYWORDS: &[&str] = &[
    "CREATE", "ALTER", "DROP", "TRUNCATE", "RENAME", "TABLE", "DATABASE", "SCHEMA", "INDEX",
    "VIEW", "PROCEDURE", "DECLARE",
];

/// Data control statements
pub static DCL_KEYWORDS: &[&str] = &["GRANT", "REVOKE", "DENY"];

/// Transaction control statements
pub static TCL_KEYWORDS: &[&str] = &["COMMIT", "ROLLBACK", "SAVEPOINT", "BEGIN", "TRANSACTION"];

/// Query clauses and boolean operators
pub static OPERATOR_KEYWORDS: &[&str] = &[
    "UNION", "FROM", "WHERE", "JOIN", "HAVING", "GROUP", "ORDER", "INTO", "VALUES", "AND", "OR",
    "NOT", "LIKE", "NULL", "ALL",
];

/// Built-in functions commonly used to smuggle or exfiltrate data
pub static FUNCTION_KEYWORDS: &[&str] = &[
    "CHAR", "NCHAR", "VARCHAR", "NVARCHAR", "CONCAT", "GROUP_CONCAT", "SUBSTRING", "ASCII",
    "CAST", "CONVERT", "HEX", "UNHEX", "LOAD_FILE",
];

/// Blind-injection timing primitives
pub static TIMING_KEYWORDS: &[&str] = &["SLEEP", "BENCHMARK", "WAITFOR", "DELAY", "PG_SLEEP"];

/// System catalogs and stored procedures
pub static SYSTEM_KEYWORDS: &[&str] = &[
    "INFORMATION_SCHEMA",
    "SYSOBJECTS",
    "SYSCOLUMNS",
    "XP_CMDSHELL",
    "SP_EXECUTESQL",
    "SHUTDOWN",
];

/// All keyword groups, in registry order
pub static KEYWORD_GROUPS: &[(&str, &[&str])] = &[
    ("data_manipulation", DML_KEYWORDS),
    ("data_definition", DDL_KEYWORDS),
    ("data_control", DCL_KEYWORDS),
    ("transaction_control", TCL_KEYWORDS),
    ("query_operators", OPERATOR_KEYWORDS),
    ("functions", FUNCTION_KEYWORDS),
    ("timing", TIMING_KEYWORDS),
    ("system", SYSTEM_KEYWORDS),
];

/// Uppercase keyword lookup
pub static SQL_KEYWORD_SET: phf::Set<&'static str> = phf_set! {
    "SELECT", "INSERT", "UPDATE", "DELETE", "MERGE", "REPLACE", "UPSERT", "EXEC", "EXECUTE",
    "CREATE", "ALTER", "DROP", "TRUNCATE", "RENAME", "TABLE", "DATABASE", "SCHEMA", "INDEX",
    "VIEW", "PROCEDURE", "DECLARE",
    "GRANT", "REVOKE", "DENY",
    "COMMIT", "ROLLBACK", "SAVEPOINT", "BEGIN", "TRANSACTION",
    "UNION", "FROM", "WHERE", "JOIN", "HAVING", "GROUP", "ORDER", "INTO", "VALUES", "AND", "OR",
    "NOT", "LIKE", "NULL", "ALL",
    "CHAR", "NCHAR", "VARCHAR", "NVARCHAR", "CONCAT", "GROUP_CONCAT", "SUBSTRING", "ASCII",
    "CAST", "CONVERT", "HEX", "UNHEX", "LOAD_FILE",
    "SLEEP", "BENCHMARK", "WAITFOR", "DELAY", "PG_SLEEP",
    "INFORMATION_SCHEMA", "SYSOBJECTS", "SYSCOLUMNS", "XP_CMDSHELL", "SP_EXECUTESQL", "SHUTDOWN",
};

/// SQL special characters and sequences.
///
/// Multi-character sequences come first so that stripping consumes them
/// before their single-character parts.
pub static SPECIAL_CHARS: &[&str] = &[
    // comment delimiters
    "--", "/*", "*/", "#",
    // quotes
    "'", "\"", "`",
    // statement terminator
    ";",
    // wildcards
    "%", "*",
    // escape and control
    "\\", "\0", "\u{08}", "\u{1a}",
];

lazy_static! {
    /// Matches any whole-word SQL keyword, case-insensitively
    pub static ref KEYWORD_REGEX: Regex = {
        let mut words: Vec<&str> = KEYWORD_GROUPS
            .iter()
            .flat_map(|(_, group)| group.iter().copied())
            .collect();
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));
        words.dedup();
        let alternation = words.join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("keyword table is valid regex")
    };

    /// Matches any special character or sequence
    pub static ref SPECIAL_CHAR_REGEX: Regex = {
        let alternation = SPECIAL_CHARS
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).expect("special character table is valid regex")
    };
}

/// Check whether a single word is a registry SQL keyword
pub fn is_sql_keyword(word: &str) -> bool {
    SQL_KEYWORD_SET.contains(word.to_ascii_uppercase().as_str())
}

/// Count occurrences of special characters in `input`
pub fn count_special_chars(input: &str) -> usize {
    SPECIAL_CHAR_REGEX.find_iter(input).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_matches_groups() {
        for (_, group) in KEYWORD_GROUPS {
            for word in *group {
                assert!(SQL_KEYWORD_SET.contains(*word), "{word} missing from set");
            }
        }
        let total: usize = KEYWORD_GROUPS.iter().map(|(_, g)| g.len()).sum();
        assert_eq!(total, SQL_KEYWORD_SET.len());
    }

    #[test]
    fn test_keyword_regex_whole_words() {
        assert!(KEYWORD_REGEX.is_match("select"));
        assert!(KEYWORD_REGEX.is_match("x ORDER y"));
        assert!(!KEYWORD_REGEX.is_match("selection"));
        assert!(!KEYWORD_REGEX.is_match("fromage"));
    }

    #[test]
    fn test_is_sql_keyword() {
        assert!(is_sql_keyword("union"));
        assert!(is_sql_keyword("Pg_Sleep"));
        assert!(!is_sql_keyword("password"));
    }

    #[test]
    fn test_count_special_chars() {
        assert_eq!(count_special_chars("plain text"), 0);
        assert_eq!(count_special_chars("a'b;c--"), 3);
        assert_eq!(count_special_chars("/* x */"), 2);
    }
}
