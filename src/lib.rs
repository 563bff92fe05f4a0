//! # Shield - Input Threat Detection and Sanitization
//!
//! Client-side defense for storefront form input: detect SQL-injection and
//! XSS-shaped payloads, sanitize them, validate fields against per-site
//! policy, and wrap UI callbacks so every value is checked before it is used.
//!
//! ## Features
//!
//! - **Pattern registry**: tagged SQL patterns with severity attached per entry
//! - **Threat detection**: typed findings and an aggregate risk level
//! - **Sanitization**: SQL stripping, lossless escaping, HTML allow-listing, text escaping
//! - **Validation**: length, strict-mode, character-class and custom rules
//! - **Protected handlers**: wrappers for value, change, setter and submit callbacks
//! - **Domain sanitizers**: email, phone, user and product records, search queries
//!
//! ## Pipeline
//!
//! ```text
//! UI event ──> handler wrapper ──> validate ──> detect ──> pattern registry
//!                   │                  │
//!                   │                  └── sanitized_input (when unsafe)
//!                   v
//!           callback(value, report)        ThreatObserver (optional)
//! ```
//!
//! ## Risk Levels
//!
//! | Level    | Meaning                                   | `is_safe` |
//! |----------|-------------------------------------------|-----------|
//! | `none`   | no findings                               | true      |
//! | `low`    | encoding or length findings only          | true      |
//! | `medium` | quotes, comments, functions, wildcards    | false     |
//! | `high`   | statements, unions, tautologies, delays   | false     |
//!
//! Nothing in the detection, sanitization, validation or handler paths
//! returns an error. Only configuration loading and caller-supplied regex
//! compilation are fallible.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shield::{detect, sanitize_input, sanitize_sql, RiskLevel};
//!
//! let result = detect("SELECT * FROM users");
//! assert!(!result.is_safe);
//! assert_eq!(result.risk_level, RiskLevel::High);
//!
//! assert_eq!(sanitize_sql("1' UNION SELECT password FROM users --"), "1 password users");
//! assert_eq!(sanitize_input("Hello <script>alert(1)</script> World", 1000), "Hello World");
//! ```
//!
//! ### Protected Handlers
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shield::{InputGuard, ProtectionOptions, SecurityPreset, ThreatHistory};
//!
//! let history = Arc::new(ThreatHistory::default());
//! let guard = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Strict))
//!     .with_observer(history.clone());
//!
//! let mut set_query = guard.protected_setter(|q| println!("query = {q}"));
//! let inspection = set_query("shoes' OR 1=1 --");
//! assert!(!inspection.is_valid());
//! ```

pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod patterns;
pub mod sanitizer;
pub mod validator;

// Re-exports for convenience
pub use config::{ProtectionOptions, SecurityPreset, ShieldConfig};
pub use detector::{
    detect, detect_optional, detect_sql_injection, DetectionResult, RiskLevel, ThreatDetector,
    ThreatFinding, ThreatType,
};
pub use domain::{
    sanitize_email, sanitize_phone, sanitize_product_data, sanitize_search_query,
    sanitize_user_input, ImageUpload, ProductData, UserRegistration,
};
pub use error::{Result, ShieldError};
pub use handlers::{
    create_protected_change_handler, create_protected_form_handler, create_protected_setter,
    create_safe_input_handler, FormOutcome, InputChange, InputGuard, Inspection, ThreatEvent,
    ThreatHistory, ThreatObserver,
};
pub use patterns::{PatternCategory, Severity, SqlPattern};
pub use sanitizer::{
    escape_sql, sanitize_html, sanitize_input, sanitize_sql, sanitize_text, HtmlOptions,
    SanitizeMode,
};
pub use validator::{
    is_sensitive_field, validate, validate_multiple_inputs, validate_sql_input, FieldSet,
    MultiValidationResult, PatternRule, ValidationOptions, ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
