//! Whole-form submit protection.

use crate::config::ProtectionOptions;
use crate::validator::{validate_multiple_inputs, FieldSet, MultiValidationResult};

use super::{InputGuard, ThreatEvent};

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<R> {
    /// The wrapped handler ran on the (possibly sanitized) fields
    Submitted {
        /// Handler output
        output: R,
        /// Validation report
        report: MultiValidationResult,
    },
    /// Threats were found and blocking is on; the handler did not run
    Blocked {
        /// Validation report
        report: MultiValidationResult,
    },
}

impl<R> FormOutcome<R> {
    /// True if the handler was held back
    pub fn is_blocked(&self) -> bool {
        matches!(self, FormOutcome::Blocked { .. })
    }

    /// Validation report
    pub fn report(&self) -> &MultiValidationResult {
        match self {
            FormOutcome::Submitted { report, .. } | FormOutcome::Blocked { report } => report,
        }
    }

    /// Handler output, if it ran
    pub fn output(self) -> Option<R> {
        match self {
            FormOutcome::Submitted { output, .. } => Some(output),
            FormOutcome::Blocked { .. } => None,
        }
    }
}

impl InputGuard {
    /// Validate a submission and either block it or forward it sanitized.
    ///
    /// Sensitive fields ([`FieldSet::is_sensitive`]) count toward blocking
    /// but are forwarded unchanged and reported without their contents.
    pub fn submit<T, R>(
        &self,
        mut fields: T,
        handler: impl FnOnce(T, &MultiValidationResult) -> R,
    ) -> FormOutcome<R>
    where
        T: FieldSet,
    {
        let report = validate_multiple_inputs(&fields, self.validation_options());

        for (name, value) in fields.fields() {
            let Some(result) = report.results.get(name) else {
                continue;
            };
            if result.detection.is_safe {
                continue;
            }
            let event = if fields.is_sensitive(name) {
                ThreatEvent::redacted(Some(name), &result.detection)
            } else {
                ThreatEvent::new(Some(name), value, &result.detection)
            };
            self.report(&event);
        }

        if self.options().block_submission && report.has_threats {
            tracing::warn!(
                fields = ?report.invalid_fields(),
                risk = %report.summary.overall,
                "form submission blocked"
            );
            return FormOutcome::Blocked { report };
        }

        if self.options().sanitize {
            let updates: Vec<(String, String)> = fields
                .fields()
                .into_iter()
                .filter(|(name, _)| !fields.is_sensitive(name))
                .filter_map(|(name, value)| {
                    let result = report.results.get(name)?;
                    let cleaned = self.sanitized(value, &result.detection, Some(result));
                    (cleaned != value).then(|| (name.to_string(), cleaned))
                })
                .collect();
            for (name, value) in updates {
                fields.set_field(&name, value);
            }
        }

        let output = handler(fields, &report);
        FormOutcome::Submitted { output, report }
    }

    /// Wrap a submit handler
    pub fn protected_form_handler<T, F, R>(&self, mut handler: F) -> impl FnMut(T) -> FormOutcome<R>
    where
        T: FieldSet,
        F: FnMut(T, &MultiValidationResult) -> R,
    {
        let guard = self.clone();
        move |fields: T| guard.submit(fields, &mut handler)
    }
}

/// Wrap a submit handler with the given options
pub fn create_protected_form_handler<T, F, R>(
    handler: F,
    options: ProtectionOptions,
) -> impl FnMut(T) -> FormOutcome<R>
where
    T: FieldSet,
    F: FnMut(T, &MultiValidationResult) -> R,
{
    InputGuard::new(options).protected_form_handler(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityPreset;
    use crate::handlers::{ThreatHistory, REDACTED_PREVIEW};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct LoginFields {
        email: String,
        password: String,
    }

    impl FieldSet for LoginFields {
        fn fields(&self) -> Vec<(&str, &str)> {
            vec![("email", self.email.as_str()), ("password", self.password.as_str())]
        }

        fn set_field(&mut self, name: &str, value: String) {
            match name {
                "email" => self.email = value,
                "password" => self.password = value,
                _ => {},
            }
        }
    }

    fn login(email: &str, password: &str) -> LoginFields {
        LoginFields {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_clean_form_submits() {
        let mut submit = create_protected_form_handler(
            |fields: LoginFields, _: &MultiValidationResult| fields,
            ProtectionOptions::default(),
        );
        let outcome = submit(login("jane@example.com", "hunter22"));
        assert!(!outcome.is_blocked());
        assert!(outcome.report().is_valid);
        assert_eq!(outcome.output(), Some(login("jane@example.com", "hunter22")));
    }

    #[test]
    fn test_blocking_keeps_handler_from_running() {
        let mut calls = 0;
        let outcome = {
            let mut submit = create_protected_form_handler(
                |_: LoginFields, _: &MultiValidationResult| calls += 1,
                ProtectionOptions::preset(SecurityPreset::Strict),
            );
            submit(login("admin'--", "x"))
        };
        assert!(outcome.is_blocked());
        assert_eq!(calls, 0);
        assert_eq!(outcome.report().invalid_fields(), vec!["email"]);
    }

    #[test]
    fn test_unblocked_threat_is_sanitized_in_place() {
        let history = Arc::new(ThreatHistory::default());
        let guard = InputGuard::default().with_observer(history.clone());

        let outcome = guard.submit(login("admin'--", "pw"), |fields, report| {
            assert!(report.has_threats);
            fields
        });

        let fields = outcome.output().unwrap();
        assert_eq!(fields.email, "admin");
        assert_eq!(fields.password, "pw");
        assert_eq!(history.len(), 1);
        assert_eq!(history.recent(1)[0].field.as_deref(), Some("email"));
    }

    #[test]
    fn test_password_forwarded_unchanged_and_redacted() {
        let history = Arc::new(ThreatHistory::default());
        let guard = InputGuard::default().with_observer(history.clone());

        let outcome = guard.submit(login("jane@example.com", "Tr0ub4dor#3;x"), |fields, report| {
            assert!(report.has_threats);
            fields
        });

        let fields = outcome.output().unwrap();
        assert_eq!(fields.password, "Tr0ub4dor#3;x");
        assert_eq!(fields.email, "jane@example.com");

        let events = history.recent(10);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field.as_deref(), Some("password"));
        assert_eq!(events[0].input_preview, REDACTED_PREVIEW);
    }

    #[test]
    fn test_sensitive_field_still_blocks() {
        let guard = InputGuard::new(ProtectionOptions::preset(SecurityPreset::Strict));
        let outcome = guard.submit(login("jane@example.com", "x'; DROP TABLE t"), |f, _| f);
        assert!(outcome.is_blocked());
        assert_eq!(outcome.report().invalid_fields(), vec!["password"]);
    }
}
