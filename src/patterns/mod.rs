//! Pattern registry for rule-based detection.
//!
//! Static tables only: SQL keyword groups, special characters, the tagged
//! detection patterns and the format regexes used by validators. Nothing
//! here is mutated after first use.
//!
//! # Pattern Categories
//!
//! | Category         | Example                        | Severity |
//! |------------------|--------------------------------|----------|
//! | `Keyword`        | `SELECT`, `DROP`               | High     |
//! | `UnionInjection` | `UNION SELECT`                 | High     |
//! | `BooleanInjection`| `OR 1=1`                      | High     |
//! | `StackedQuery`   | `; DROP TABLE`                 | High     |
//! | `TimeBased`      | `SLEEP(5)`, `WAITFOR DELAY`    | High     |
//! | `SystemObject`   | `information_schema`           | High     |
//! | `MetaCharacter`  | `'`, `"`                       | Medium   |
//! | `Comment`        | `--`, `/*`, `#`                | Medium   |
//! | `Function`       | `CHAR(`, `CONCAT(`             | Medium   |
//! | `Wildcard`       | `LIKE '%`                      | Medium   |
//! | `Comparison`     | `'x'='x'`                      | Medium   |
//! | `Encoding`       | `%27`, `0x41`, `&#39;`         | Low      |

mod formats;
mod keywords;

pub use formats::{
    is_alphanumeric, is_safe_filename, is_valid_email, is_valid_phone, is_valid_url,
    ALPHANUMERIC_REGEX, EMAIL_REGEX, FILENAME_REGEX, PHONE_REGEX, URL_REGEX,
};
pub use keywords::{
    count_special_chars, is_sql_keyword, KEYWORD_GROUPS, KEYWORD_REGEX, SPECIAL_CHARS,
    SPECIAL_CHAR_REGEX, SQL_KEYWORD_SET,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Intrinsic severity of a pattern or finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Suspicious
    Medium,
    /// Likely malicious
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Pattern categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Statement keyword
    Keyword,
    /// UNION-based injection
    UnionInjection,
    /// Boolean tautology injection
    BooleanInjection,
    /// Stacked (terminated) query
    StackedQuery,
    /// Blind timing primitive
    TimeBased,
    /// System catalog or procedure
    SystemObject,
    /// Quote characters
    MetaCharacter,
    /// Comment markers
    Comment,
    /// Built-in function call
    Function,
    /// LIKE wildcard
    Wildcard,
    /// Quoted comparison
    Comparison,
    /// URL/hex/entity encoding
    Encoding,
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PatternCategory::Keyword => "keyword",
            PatternCategory::UnionInjection => "union_injection",
            PatternCategory::BooleanInjection => "boolean_injection",
            PatternCategory::StackedQuery => "stacked_query",
            PatternCategory::TimeBased => "time_based",
            PatternCategory::SystemObject => "system_object",
            PatternCategory::MetaCharacter => "meta_character",
            PatternCategory::Comment => "comment",
            PatternCategory::Function => "function",
            PatternCategory::Wildcard => "wildcard",
            PatternCategory::Comparison => "comparison",
            PatternCategory::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

/// A tagged SQL detection pattern
#[derive(Debug, Clone)]
pub struct SqlPattern {
    /// Pattern name
    pub name: &'static str,
    /// Regex pattern
    pub pattern: &'static str,
    /// Pattern category
    pub category: PatternCategory,
    /// Severity attached to every match of this pattern
    pub severity: Severity,
    /// Description
    pub description: &'static str,
}

/// Detection patterns, in scan order
pub static SQL_PATTERNS: &[SqlPattern] = &[
    SqlPattern {
        name: "union_select",
        pattern: r"(?i)\bunion\b(?:\s+all)?\s+select\b",
        category: PatternCategory::UnionInjection,
        severity: Severity::High,
        description: "UNION-based query injection",
    },
    SqlPattern {
        name: "boolean_tautology",
        pattern: r#"(?i)\b(?:or|and)\b\s+['"`]?\w+['"`]?\s*(?:=|<>|!=|<=|>=|<|>)\s*['"`]?\w+"#,
        category: PatternCategory::BooleanInjection,
        severity: Severity::High,
        description: "Boolean condition that forces a clause true or false",
    },
    SqlPattern {
        name: "stacked_query",
        pattern: r"(?i);\s*\b(?:select|insert|update|delete|drop|create|alter|truncate|exec|execute|declare|shutdown)\b",
        category: PatternCategory::StackedQuery,
        severity: Severity::High,
        description: "Statement terminator followed by a second statement",
    },
    SqlPattern {
        name: "statement_keyword",
        pattern: r"(?i)\b(?:select|insert|update|delete|merge|drop|create|alter|truncate|exec|execute|grant|revoke)\b",
        category: PatternCategory::Keyword,
        severity: Severity::High,
        description: "SQL statement keyword",
    },
    SqlPattern {
        name: "time_delay",
        pattern: r"(?i)\b(?:sleep|benchmark|pg_sleep)\s*\(|\bwaitfor\s+delay\b",
        category: PatternCategory::TimeBased,
        severity: Severity::High,
        description: "Time-based blind injection primitive",
    },
    SqlPattern {
        name: "system_object",
        pattern: r"(?i)\b(?:information_schema|sysobjects|syscolumns|xp_cmdshell|sp_executesql)\b",
        category: PatternCategory::SystemObject,
        severity: Severity::High,
        description: "System catalog or stored procedure reference",
    },
    SqlPattern {
        name: "quote_char",
        pattern: r#"['"`]|%27|%22|%60"#,
        category: PatternCategory::MetaCharacter,
        severity: Severity::Medium,
        description: "Quote character, raw or URL-encoded",
    },
    SqlPattern {
        name: "comment_marker",
        pattern: r"--|/\*|\*/|#",
        category: PatternCategory::Comment,
        severity: Severity::Medium,
        description: "SQL comment marker",
    },
    SqlPattern {
        name: "sql_function",
        pattern: r"(?i)\b(?:char|nchar|varchar|nvarchar|concat|group_concat|substring|ascii|cast|convert|hex|unhex|load_file)\s*\(",
        category: PatternCategory::Function,
        severity: Severity::Medium,
        description: "SQL built-in function call",
    },
    SqlPattern {
        name: "like_wildcard",
        pattern: r#"(?i)\blike\b\s*['"`]?[^\s'"`]*[%*]"#,
        category: PatternCategory::Wildcard,
        severity: Severity::Medium,
        description: "LIKE clause with wildcard",
    },
    SqlPattern {
        name: "quoted_comparison",
        pattern: r#"['"`]\s*(?:=|<>|!=|<=|>=|<|>)\s*['"`]"#,
        category: PatternCategory::Comparison,
        severity: Severity::Medium,
        description: "Comparison between quoted operands",
    },
    SqlPattern {
        name: "url_encoding",
        pattern: r"%[0-9a-fA-F]{2}",
        category: PatternCategory::Encoding,
        severity: Severity::Low,
        description: "URL-encoded byte",
    },
    SqlPattern {
        name: "hex_literal",
        pattern: r"(?i)\b0x[0-9a-f]{2,}\b",
        category: PatternCategory::Encoding,
        severity: Severity::Low,
        description: "Hexadecimal literal",
    },
    SqlPattern {
        name: "char_entity",
        pattern: r"&#x?[0-9a-fA-F]+;?",
        category: PatternCategory::Encoding,
        severity: Severity::Low,
        description: "Numeric character reference",
    },
];

lazy_static! {
    /// Compiled detection patterns
    pub static ref SQL_REGEX: Vec<(Regex, &'static SqlPattern)> = {
        SQL_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p.pattern).ok().map(|r| (r, p)))
            .collect()
    };
}

/// A single pattern hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    /// Pattern that matched
    pub pattern: &'static SqlPattern,
    /// Matched substring
    pub text: &'a str,
}

/// Match content against all patterns, one entry per matched substring
pub fn match_patterns(content: &str) -> Vec<PatternMatch<'_>> {
    let mut matches = Vec::new();

    for (regex, pattern) in SQL_REGEX.iter() {
        for m in regex.find_iter(content) {
            matches.push(PatternMatch {
                pattern,
                text: m.as_str(),
            });
        }
    }

    matches
}

impl PartialEq for SqlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SqlPattern {}
