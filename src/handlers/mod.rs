//! Protected input handlers.
//!
//! Higher-order wrappers that run detection, validation and sanitization on
//! every value before it reaches a caller-supplied callback.
//!
//! # Wrappers
//!
//! | Wrapper                            | Wraps                              | Returns              |
//! |------------------------------------|------------------------------------|----------------------|
//! | [`create_safe_input_handler`]      | `FnMut(String) -> R`               | `FnMut(&str) -> R`   |
//! | [`create_protected_change_handler`]| `FnMut(InputChange, &Inspection)`  | `FnMut(InputChange)` |
//! | [`create_protected_setter`]        | `FnMut(String)` state setter       | `FnMut(&str) -> Inspection` |
//! | [`create_protected_form_handler`]  | `FnMut(T, &MultiValidationResult)` | `FnMut(T) -> FormOutcome` |
//!
//! None of them fail. A form is only held back when `block_submission` is
//! set; otherwise values are sanitized and forwarded, so a false positive
//! never locks a user out.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shield::handlers::{InputGuard, ThreatHistory};
//! use shield::config::{ProtectionOptions, SecurityPreset};
//!
//! let history = Arc::new(ThreatHistory::new(50));
//! let guard = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Moderate))
//!     .with_observer(history.clone());
//!
//! let mut on_search = guard.safe_input_handler(|q: String| run_search(q));
//! on_search("shoes' OR 1=1 --");
//! assert_eq!(history.len(), 1);
//! ```

mod form;
mod history;

pub use form::{create_protected_form_handler, FormOutcome};
pub use history::{HistorySummary, ThreatEvent, ThreatHistory, ThreatObserver, REDACTED_PREVIEW};

use std::sync::Arc;

use crate::config::{ProtectionOptions, ShieldConfig};
use crate::detector::{detect, DetectionResult};
use crate::sanitizer::{sanitize_sql, strip_markup};
use crate::validator::{is_sensitive_field, validate, ValidationOptions, ValidationResult};

/// A change event from a single controlled input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChange {
    /// Input name
    pub name: String,
    /// Current value
    pub value: String,
}

impl InputChange {
    /// Create a change event
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What a guard decided about one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Value to forward (sanitized when sanitization is on)
    pub value: String,
    /// Detector output
    pub detection: DetectionResult,
    /// Validator output, when validation is on
    pub validation: Option<ValidationResult>,
}

impl Inspection {
    /// Validation errors, empty when validation is off
    pub fn errors(&self) -> &[String] {
        match &self.validation {
            Some(v) => &v.errors,
            None => &[],
        }
    }

    /// True when validation is off or passed
    pub fn is_valid(&self) -> bool {
        self.validation.as_ref().map_or(true, |v| v.is_valid)
    }
}

/// Detection, validation and sanitization bundled for handler wrappers
#[derive(Clone)]
pub struct InputGuard {
    options: ProtectionOptions,
    validation: ValidationOptions,
    observer: Option<Arc<dyn ThreatObserver>>,
}

impl std::fmt::Debug for InputGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGuard")
            .field("options", &self.options)
            .field("validation", &self.validation)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for InputGuard {
    fn default() -> Self {
        Self::new(ProtectionOptions::default())
    }
}

impl InputGuard {
    /// Create a guard from options
    pub fn new(options: ProtectionOptions) -> Self {
        Self {
            validation: ValidationOptions::from(&options),
            options,
            observer: None,
        }
    }

    /// Create a guard from loaded configuration
    pub fn from_config(config: &ShieldConfig) -> Self {
        Self::new(config.protection_options())
    }

    /// Notify `observer` of every unsafe value
    pub fn with_observer(mut self, observer: Arc<dyn ThreatObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Use custom validation rules; length and policy come from the options
    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = ValidationOptions {
            max_length: self.options.max_length,
            strict_mode: self.options.strict_mode,
            allow_special_chars: self.options.allow_special_chars,
            ..validation
        };
        self
    }

    /// Active options
    pub fn options(&self) -> &ProtectionOptions {
        &self.options
    }

    /// Active validation rules
    pub fn validation_options(&self) -> &ValidationOptions {
        &self.validation
    }

    /// Run the pipeline on one value.
    ///
    /// Values of sensitive fields (see [`is_sensitive_field`]) are checked
    /// and reported without their contents, and forwarded unchanged.
    pub fn inspect(&self, field: Option<&str>, value: &str) -> Inspection {
        let validation = self
            .options
            .validate
            .then(|| validate(value, &self.validation));
        let detection = match &validation {
            Some(v) => v.detection.clone(),
            None => detect(value),
        };
        let sensitive = field.is_some_and(is_sensitive_field);

        if !detection.is_safe {
            let event = if sensitive {
                ThreatEvent::redacted(field, &detection)
            } else {
                ThreatEvent::new(field, value, &detection)
            };
            self.report(&event);
        }

        let forwarded = if self.options.sanitize && !sensitive {
            self.sanitized(value, &detection, validation.as_ref())
        } else {
            value.to_string()
        };

        Inspection {
            value: forwarded,
            detection,
            validation,
        }
    }

    pub(crate) fn sanitized(
        &self,
        value: &str,
        detection: &DetectionResult,
        validation: Option<&ValidationResult>,
    ) -> String {
        let cleaned = match validation {
            Some(v) => v.sanitized_input.clone(),
            None if detection.is_safe => value.to_string(),
            None => sanitize_sql(value),
        };
        if self.options.strip_markup {
            strip_markup(&cleaned)
        } else {
            cleaned
        }
    }

    pub(crate) fn report(&self, event: &ThreatEvent) {
        if self.options.log_threats {
            tracing::warn!(
                field = event.field.as_deref().unwrap_or("-"),
                risk = %event.risk_level,
                findings = event.threat_count,
                preview = %event.input_preview,
                "input threat detected"
            );
        }

        if let Some(observer) = &self.observer {
            observer.on_threat(event);
        }
    }

    /// Wrap a value handler
    pub fn safe_input_handler<F, R>(&self, mut handler: F) -> impl FnMut(&str) -> R
    where
        F: FnMut(String) -> R,
    {
        let guard = self.clone();
        move |value: &str| {
            let inspection = guard.inspect(None, value);
            handler(inspection.value)
        }
    }

    /// Wrap a change-event handler
    pub fn protected_change_handler<F, R>(&self, mut handler: F) -> impl FnMut(InputChange) -> R
    where
        F: FnMut(InputChange, &Inspection) -> R,
    {
        let guard = self.clone();
        move |change: InputChange| {
            let inspection = guard.inspect(Some(&change.name), &change.value);
            let forwarded = InputChange {
                name: change.name,
                value: inspection.value.clone(),
            };
            handler(forwarded, &inspection)
        }
    }

    /// Wrap a state setter; the wrapper returns the inspection for feedback
    pub fn protected_setter<F>(&self, mut setter: F) -> impl FnMut(&str) -> Inspection
    where
        F: FnMut(String),
    {
        let guard = self.clone();
        move |value: &str| {
            let inspection = guard.inspect(None, value);
            setter(inspection.value.clone());
            inspection
        }
    }
}

/// Wrap a value handler with the given options
pub fn create_safe_input_handler<F, R>(
    handler: F,
    options: ProtectionOptions,
) -> impl FnMut(&str) -> R
where
    F: FnMut(String) -> R,
{
    InputGuard::new(options).safe_input_handler(handler)
}

/// Wrap a change-event handler with the given options
pub fn create_protected_change_handler<F, R>(
    handler: F,
    options: ProtectionOptions,
) -> impl FnMut(InputChange) -> R
where
    F: FnMut(InputChange, &Inspection) -> R,
{
    InputGuard::new(options).protected_change_handler(handler)
}

/// Wrap a state setter with the given options
pub fn create_protected_setter<F>(setter: F, options: ProtectionOptions) -> impl FnMut(&str) -> Inspection
where
    F: FnMut(String),
{
    InputGuard::new(options).protected_setter(setter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityPreset;
    use crate::detector::RiskLevel;

    #[test]
    fn test_safe_value_passes_unchanged() {
        let mut seen = Vec::new();
        {
            let mut handler =
                create_safe_input_handler(|v: String| seen.push(v), ProtectionOptions::default());
            handler("running shoes ");
        }
        assert_eq!(seen, vec!["running shoes ".to_string()]);
    }

    #[test]
    fn test_unsafe_value_sanitized() {
        let mut handler = create_safe_input_handler(|v: String| v, ProtectionOptions::default());
        assert_eq!(handler("shoes' OR 1=1 --"), "shoes 1=1");
    }

    #[test]
    fn test_sanitize_off_forwards_original() {
        let options = ProtectionOptions {
            sanitize: false,
            ..ProtectionOptions::default()
        };
        let mut handler = create_safe_input_handler(|v: String| v, options);
        assert_eq!(handler("x'; DROP TABLE t"), "x'; DROP TABLE t");
    }

    #[test]
    fn test_observer_notified() {
        let history = Arc::new(ThreatHistory::new(10));
        let guard = InputGuard::default().with_observer(history.clone());

        let mut handler = guard.safe_input_handler(|_v: String| ());
        handler("hello");
        handler("1 UNION SELECT 2");

        assert_eq!(history.len(), 1);
        assert_eq!(history.recent(1)[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_change_handler_gets_report() {
        let mut handler = create_protected_change_handler(
            |change: InputChange, inspection: &Inspection| {
                (change.value, inspection.is_valid(), inspection.errors().len())
            },
            ProtectionOptions::preset(SecurityPreset::Strict),
        );

        let (value, valid, errors) = handler(InputChange::new("name", "it's"));
        assert_eq!(value, "its");
        assert!(!valid);
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_setter_returns_inspection() {
        let mut state = String::new();
        let inspection = {
            let mut set = create_protected_setter(|v| state = v, ProtectionOptions::default());
            set("<script>x</script>hi")
        };
        assert_eq!(state, "hi");
        assert!(inspection.detection.is_safe);
    }

    #[test]
    fn test_validation_off() {
        let options = ProtectionOptions {
            validate: false,
            ..ProtectionOptions::default()
        };
        let inspection = InputGuard::new(options).inspect(Some("q"), "DROP TABLE x");
        assert!(inspection.validation.is_none());
        assert!(inspection.is_valid());
        assert_eq!(inspection.detection.risk_level, RiskLevel::High);
        assert_eq!(inspection.value, "x");
    }

    #[test]
    fn test_sensitive_change_not_rewritten() {
        let history = Arc::new(ThreatHistory::new(10));
        let guard = InputGuard::default().with_observer(history.clone());

        let mut on_change = guard.protected_change_handler(|change, _| change.value);
        assert_eq!(on_change(InputChange::new("password", "p#ss;word'")), "p#ss;word'");
        assert_eq!(on_change(InputChange::new("nickname", "p#ss;word'")), "pssword");

        let recent = history.recent(2);
        assert_eq!(recent[1].field.as_deref(), Some("password"));
        assert_eq!(recent[1].input_preview, REDACTED_PREVIEW);
        assert_ne!(recent[0].input_preview, REDACTED_PREVIEW);
    }

    #[test]
    fn test_custom_rules_keep_option_policy() {
        let guard = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Strict))
            .with_validation(
                ValidationOptions::new()
                    .max_length(9999)
                    .forbid(crate::validator::PatternRule::literal("spam")),
            );
        assert_eq!(guard.validation_options().max_length, 100);
        assert!(guard.validation_options().strict_mode);
        assert!(!guard.inspect(None, "buy spam").is_valid());
    }
}
