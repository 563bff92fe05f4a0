//! Input validation.
//!
//! Combines detector output with length, character-class and caller
//! pattern rules into an accept/reject decision. Validation never mutates
//! its input and never fails; it always returns a sanitized alternative so
//! the caller can choose to auto-correct instead of reject.
//!
//! # Rules
//!
//! | Rule                    | Error when                                      |
//! |-------------------------|-------------------------------------------------|
//! | length                  | more than `max_length` characters               |
//! | strict mode             | detector reports `is_safe == false`             |
//! | special characters      | `allow_special_chars` is off and chars flagged  |
//! | forbidden patterns      | any rule matches                                |
//! | whitelist patterns      | list non-empty and no rule matches              |

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::Serialize;

use crate::config::ProtectionOptions;
use crate::detector::{detect, DetectionResult, RiskLevel, ThreatFinding, ThreatType};
use crate::error::Result;
use crate::patterns::Severity;
use crate::sanitizer::sanitize_sql;

/// Default maximum accepted length
pub const DEFAULT_MAX_LENGTH: usize = 255;

/// A caller-supplied pattern
#[derive(Debug, Clone)]
pub enum PatternRule {
    /// Regex match anywhere in the input
    Regex(Regex),
    /// Case-sensitive substring
    Literal(String),
}

impl PatternRule {
    /// Compile a regex rule
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(PatternRule::Regex(Regex::new(pattern)?))
    }

    /// Substring rule
    pub fn literal(text: impl Into<String>) -> Self {
        PatternRule::Literal(text.into())
    }

    /// Test the rule against input
    pub fn matches(&self, input: &str) -> bool {
        match self {
            PatternRule::Regex(re) => re.is_match(input),
            PatternRule::Literal(text) => input.contains(text.as_str()),
        }
    }

    /// Source text of the rule
    pub fn as_str(&self) -> &str {
        match self {
            PatternRule::Regex(re) => re.as_str(),
            PatternRule::Literal(text) => text,
        }
    }
}

impl From<Regex> for PatternRule {
    fn from(re: Regex) -> Self {
        PatternRule::Regex(re)
    }
}

/// Validation options
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Maximum length in characters
    pub max_length: usize,
    /// Escalate unsafe detections into errors
    pub strict_mode: bool,
    /// Accept inputs flagged for special characters
    pub allow_special_chars: bool,
    /// Any match is an error
    pub forbidden_patterns: Vec<PatternRule>,
    /// When non-empty, input must match at least one
    pub whitelist_patterns: Vec<PatternRule>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            strict_mode: false,
            allow_special_chars: true,
            forbidden_patterns: Vec::new(),
            whitelist_patterns: Vec::new(),
        }
    }
}

impl From<&ProtectionOptions> for ValidationOptions {
    fn from(options: &ProtectionOptions) -> Self {
        Self {
            max_length: options.max_length,
            strict_mode: options.strict_mode,
            allow_special_chars: options.allow_special_chars,
            ..Self::default()
        }
    }
}

impl ValidationOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Set length limit
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set special-character tolerance
    pub fn allow_special_chars(mut self, allow: bool) -> Self {
        self.allow_special_chars = allow;
        self
    }

    /// Add a forbidden rule
    pub fn forbid(mut self, rule: PatternRule) -> Self {
        self.forbidden_patterns.push(rule);
        self
    }

    /// Add a whitelist rule
    pub fn allow(mut self, rule: PatternRule) -> Self {
        self.whitelist_patterns.push(rule);
        self
    }
}

/// Result of validating one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// No errors were recorded
    pub is_valid: bool,
    /// Human-readable errors
    pub errors: Vec<String>,
    /// Detector output, extended with pattern-rule findings
    pub detection: DetectionResult,
    /// Input as-is when safe, SQL-sanitized otherwise
    pub sanitized_input: String,
}

/// Validate one input
pub fn validate(input: &str, options: &ValidationOptions) -> ValidationResult {
    let base = detect(input);
    let mut errors = Vec::new();

    let length = input.chars().count();
    if length > options.max_length {
        errors.push(format!(
            "Input exceeds maximum length of {} characters",
            options.max_length
        ));
    }

    if options.strict_mode && !base.is_safe {
        errors.push(format!(
            "Potentially dangerous input detected (risk level: {})",
            base.risk_level
        ));
    }

    if !options.allow_special_chars && base.has_threat_type(ThreatType::SuspiciousChars) {
        errors.push("Input contains too many special characters".to_string());
    }

    let mut findings = Vec::new();
    for rule in &options.forbidden_patterns {
        if rule.matches(input) {
            errors.push(format!("Input matches forbidden pattern: {}", rule.as_str()));
            findings.push(ThreatFinding::new(
                ThreatType::CustomPattern,
                rule.as_str(),
                Severity::Medium,
                "Forbidden pattern matched",
            ));
        }
    }

    if !input.is_empty()
        && !options.whitelist_patterns.is_empty()
        && !options.whitelist_patterns.iter().any(|r| r.matches(input))
    {
        errors.push("Input does not match any allowed pattern".to_string());
        findings.push(ThreatFinding::new(
            ThreatType::WhitelistViolation,
            "",
            Severity::Low,
            "No allowed pattern matched",
        ));
    }

    let sanitized_input = if base.is_safe {
        input.to_string()
    } else {
        sanitize_sql(input)
    };

    let detection = if findings.is_empty() {
        base
    } else {
        let input_length = base.input_length.max(length);
        let mut threats = base.threats;
        threats.extend(findings);
        DetectionResult::from_threats(threats, input_length)
    };

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        detection,
        sanitized_input,
    }
}

/// Alias of [`validate`] under its SQL-specific name
pub fn validate_sql_input(input: &str, options: &ValidationOptions) -> ValidationResult {
    validate(input, options)
}

/// True for field names that carry secrets (`password`, `new_password`,
/// `client_secret`).
///
/// Sensitive fields are validated like any other but never rewritten, and
/// their contents never reach logs or threat history.
pub fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    ["password", "passwd", "secret"]
        .iter()
        .any(|marker| name.contains(marker))
}

/// Named string fields of a form record.
///
/// Implement this for a typed record (`LoginFields`, `ProductFields`) to
/// validate it in one call; maps implement it out of the box.
pub trait FieldSet {
    /// `(name, value)` pairs to validate
    fn fields(&self) -> Vec<(&str, &str)>;

    /// Replace one field's value
    fn set_field(&mut self, name: &str, value: String);

    /// Whether a field must pass through untouched and unlogged
    fn is_sensitive(&self, name: &str) -> bool {
        is_sensitive_field(name)
    }
}

impl FieldSet for BTreeMap<String, String> {
    fn fields(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    fn set_field(&mut self, name: &str, value: String) {
        if let Some(slot) = self.get_mut(name) {
            *slot = value;
        }
    }
}

impl FieldSet for HashMap<String, String> {
    fn fields(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    fn set_field(&mut self, name: &str, value: String) {
        if let Some(slot) = self.get_mut(name) {
            *slot = value;
        }
    }
}

/// Field counts per risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskSummary {
    /// Highest risk across all fields
    pub overall: RiskLevel,
    /// Fields at high risk
    pub high: usize,
    /// Fields at medium risk
    pub medium: usize,
    /// Fields at low risk
    pub low: usize,
    /// Fields with no findings
    pub none: usize,
    /// Findings across all fields
    pub total_threats: usize,
}

impl RiskSummary {
    fn record(&mut self, detection: &DetectionResult) {
        match detection.risk_level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::None => self.none += 1,
        }
        self.overall = self.overall.max(detection.risk_level);
        self.total_threats += detection.threats.len();
    }
}

/// Result of validating a whole form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiValidationResult {
    /// Per-field results
    pub results: BTreeMap<String, ValidationResult>,
    /// Every field is valid
    pub is_valid: bool,
    /// Some field's detection is unsafe
    pub has_threats: bool,
    /// Risk summary
    pub summary: RiskSummary,
}

impl MultiValidationResult {
    /// Result for one field
    pub fn field(&self, name: &str) -> Option<&ValidationResult> {
        self.results.get(name)
    }

    /// Names of invalid fields
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| !r.is_valid)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Validate every field of a record
pub fn validate_multiple_inputs<T: FieldSet + ?Sized>(
    inputs: &T,
    options: &ValidationOptions,
) -> MultiValidationResult {
    let mut results = BTreeMap::new();
    let mut summary = RiskSummary::default();

    for (name, value) in inputs.fields() {
        let result = validate(value, options);
        summary.record(&result.detection);
        results.insert(name.to_string(), result);
    }

    MultiValidationResult {
        is_valid: results.values().all(|r| r.is_valid),
        has_threats: results.values().any(|r| !r.detection.is_safe),
        results,
        summary,
    }
}
