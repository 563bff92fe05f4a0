//! Threat detection.
//!
//! Scans a string against the pattern registry and reports typed findings
//! plus an aggregate risk level. Detection is advisory: a finding is data,
//! and gating on it is the validator's job.
//!
//! # Risk Aggregation
//!
//! | Findings                  | `risk_level` | `is_safe` |
//! |---------------------------|--------------|-----------|
//! | none                      | `None`       | true      |
//! | only `low`                | `Low`        | true      |
//! | any `medium`, no `high`   | `Medium`     | false     |
//! | any `high`                | `High`       | false     |
//!
//! A lone low-severity finding (for example, a long product description)
//! leaves the input safe. Strict-mode validation turns `is_safe == false`
//! into a hard failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shield::detector::{detect, RiskLevel};
//!
//! let result = detect("SELECT * FROM users");
//! assert!(!result.is_safe);
//! assert_eq!(result.risk_level, RiskLevel::High);
//! ```

use serde::{Deserialize, Serialize};

use crate::patterns::{count_special_chars, match_patterns, PatternCategory};

pub use crate::patterns::Severity;

/// More special characters than this raises a `suspicious_chars` finding
pub const SPECIAL_CHAR_THRESHOLD: usize = 2;

/// Inputs longer than this (in characters) raise an `excessive_length` finding
pub const MAX_SAFE_LENGTH: usize = 1000;

/// Kind of finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    /// A registry SQL pattern matched
    SqlPattern,
    /// Too many special characters
    SuspiciousChars,
    /// Input longer than the detector's length limit
    ExcessiveLength,
    /// A caller-supplied forbidden pattern matched
    CustomPattern,
    /// Input matched none of the caller's allowed patterns
    WhitelistViolation,
}

impl std::fmt::Display for ThreatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatType::SqlPattern => write!(f, "sql_pattern"),
            ThreatType::SuspiciousChars => write!(f, "suspicious_chars"),
            ThreatType::ExcessiveLength => write!(f, "excessive_length"),
            ThreatType::CustomPattern => write!(f, "custom_pattern"),
            ThreatType::WhitelistViolation => write!(f, "whitelist_violation"),
        }
    }
}

/// Aggregate risk for one input
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No findings
    #[default]
    None,
    /// Only low-severity findings
    Low,
    /// At least one medium-severity finding
    Medium,
    /// At least one high-severity finding
    High,
}

impl RiskLevel {
    /// Risk implied by the highest finding severity
    pub fn from_max_severity(severity: Option<Severity>) -> Self {
        match severity {
            None => RiskLevel::None,
            Some(Severity::Low) => RiskLevel::Low,
            Some(Severity::Medium) => RiskLevel::Medium,
            Some(Severity::High) => RiskLevel::High,
        }
    }

    /// True if this level does not exceed `limit`
    pub fn is_at_most(self, limit: RiskLevel) -> bool {
        self <= limit
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::None => write!(f, "none"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(RiskLevel::None),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// One matched occurrence of a suspicious pattern or characteristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatFinding {
    /// Kind of finding
    #[serde(rename = "type")]
    pub threat_type: ThreatType,
    /// Matched substring (empty for whole-input findings)
    pub matched_text: String,
    /// Severity
    pub severity: Severity,
    /// Human-readable description
    pub description: String,
    /// Registry category, for `sql_pattern` findings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PatternCategory>,
}

impl ThreatFinding {
    /// Create a finding that is not tied to a registry pattern
    pub fn new(
        threat_type: ThreatType,
        matched_text: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            threat_type,
            matched_text: matched_text.into(),
            severity,
            description: description.into(),
            category: None,
        }
    }
}

/// Result of a detection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// True when `risk_level` is `None` or `Low`
    pub is_safe: bool,
    /// Findings, in registry order
    pub threats: Vec<ThreatFinding>,
    /// Aggregate risk
    pub risk_level: RiskLevel,
    /// Input length in characters
    pub input_length: usize,
}

impl DetectionResult {
    /// Result for absent or empty input
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            threats: vec![],
            risk_level: RiskLevel::None,
            input_length: 0,
        }
    }

    /// Build a result from findings, deriving risk and safety
    pub fn from_threats(threats: Vec<ThreatFinding>, input_length: usize) -> Self {
        let risk_level = RiskLevel::from_max_severity(threats.iter().map(|t| t.severity).max());
        Self {
            is_safe: risk_level.is_at_most(RiskLevel::Low),
            threats,
            risk_level,
            input_length,
        }
    }

    /// Highest finding severity, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.threats.iter().map(|t| t.severity).max()
    }

    /// True if any finding has the given type
    pub fn has_threat_type(&self, threat_type: ThreatType) -> bool {
        self.threats.iter().any(|t| t.threat_type == threat_type)
    }
}

/// Detector with tunable thresholds
#[derive(Debug, Clone)]
pub struct ThreatDetector {
    /// Length above which an `excessive_length` finding is raised
    pub max_safe_length: usize,
    /// Special-character count above which a `suspicious_chars` finding is raised
    pub special_char_threshold: usize,
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self {
            max_safe_length: MAX_SAFE_LENGTH,
            special_char_threshold: SPECIAL_CHAR_THRESHOLD,
        }
    }
}

impl ThreatDetector {
    /// Create detector with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length limit
    pub fn with_max_safe_length(mut self, max: usize) -> Self {
        self.max_safe_length = max;
        self
    }

    /// Scan input for threats
    pub fn scan(&self, input: &str) -> DetectionResult {
        if input.is_empty() {
            return DetectionResult::safe();
        }

        let mut threats: Vec<ThreatFinding> = match_patterns(input)
            .into_iter()
            .map(|m| ThreatFinding {
                threat_type: ThreatType::SqlPattern,
                matched_text: m.text.to_string(),
                severity: m.pattern.severity,
                description: m.pattern.description.to_string(),
                category: Some(m.pattern.category),
            })
            .collect();

        let special = count_special_chars(input);
        if special > self.special_char_threshold {
            threats.push(ThreatFinding::new(
                ThreatType::SuspiciousChars,
                "",
                Severity::Medium,
                format!("{special} SQL special characters present"),
            ));
        }

        let length = input.chars().count();
        if length > self.max_safe_length {
            threats.push(ThreatFinding::new(
                ThreatType::ExcessiveLength,
                "",
                Severity::Low,
                format!(
                    "Input length {length} exceeds {} characters",
                    self.max_safe_length
                ),
            ));
        }

        let result = DetectionResult::from_threats(threats, length);
        if !result.threats.is_empty() {
            tracing::debug!(
                risk = %result.risk_level,
                findings = result.threats.len(),
                "threat scan complete"
            );
        }
        result
    }
}

/// Scan input with the default detector
pub fn detect(input: &str) -> DetectionResult {
    ThreatDetector::default().scan(input)
}

/// Scan possibly-absent input; absence is never a threat
pub fn detect_optional(input: Option<&str>) -> DetectionResult {
    input.map_or_else(DetectionResult::safe, detect)
}

/// Alias of [`detect`] under its SQL-specific name
pub fn detect_sql_injection(input: &str) -> DetectionResult {
    detect(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_safe() {
        for result in [detect(""), detect_optional(None), detect_optional(Some(""))] {
            assert!(result.is_safe);
            assert!(result.threats.is_empty());
            assert_eq!(result.risk_level, RiskLevel::None);
        }
    }

    #[test]
    fn test_select_from_is_high() {
        let result = detect("SELECT * FROM users");
        assert!(!result.is_safe);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(!result.threats.is_empty());
    }

    #[test]
    fn test_union_injection_is_high() {
        let result = detect_sql_injection("1' UNION SELECT password FROM users --");
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result
            .threats
            .iter()
            .any(|t| t.category == Some(PatternCategory::UnionInjection)));
    }

    #[test]
    fn test_single_quote_is_medium() {
        let result = detect("test'value");
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(!result.is_safe);
        assert!(!result.has_threat_type(ThreatType::SuspiciousChars));
    }

    #[test]
    fn test_suspicious_chars() {
        let result = detect("a'b'c;d");
        assert!(result.has_threat_type(ThreatType::SuspiciousChars));
    }

    #[test]
    fn test_long_benign_input_stays_safe() {
        let input = "lorem ipsum ".repeat(100);
        let result = detect(&input);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.is_safe);
        assert_eq!(result.threats.len(), 1);
        assert_eq!(result.threats[0].threat_type, ThreatType::ExcessiveLength);
        assert_eq!(result.input_length, 1200);
    }

    #[test]
    fn test_benign_text() {
        let result = detect("Comfortable running shoes in blue");
        assert!(result.is_safe);
        assert_eq!(result.risk_level, RiskLevel::None);
        assert_eq!(result.input_length, 33);
    }

    #[test]
    fn test_risk_level_parse_and_order() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("severe".parse::<RiskLevel>().is_err());
        assert!(RiskLevel::Low.is_at_most(RiskLevel::Medium));
        assert!(!RiskLevel::High.is_at_most(RiskLevel::Medium));
    }

    #[test]
    fn test_finding_serializes_type_field() {
        let finding = ThreatFinding::new(ThreatType::SuspiciousChars, "", Severity::Medium, "x");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "suspicious_chars");
        assert_eq!(json["severity"], "medium");
        assert!(json.get("category").is_none());
    }
}
