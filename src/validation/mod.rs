// File: src/validation/mod.rs
// Purpose: Declarative form-field validation producing per-field error maps

pub mod validators;

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::config::ValidationConfig;
use validators::capitalize;
pub use validators::{is_valid_email, sanitize, sanitize_all, strip_markup, SanitizeFilter};

/// Field name -> error message. Absence of a key means the field is valid;
/// a field never carries more than one message.
pub type ErrorMap = HashMap<String, String>;

/// Content rule for one field, beyond the required check.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Value must match the regex.
    Pattern(Regex),
    /// Value must be a well-formed email address.
    Email,
}

/// Declarative validation instruction for one form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Sanitized input value (run [`sanitize`] on the raw value first).
    pub value: String,
    /// Whether emptiness alone is an error.
    pub required: bool,
    /// Optional content rule; `None` means no check beyond `required`.
    pub rule: Option<FieldRule>,
    /// Overrides the catalog default when the rule fails.
    pub error_message: Option<String>,
}

impl FieldSpec {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            required: false,
            rule: None,
            error_message: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.rule = Some(FieldRule::Pattern(pattern));
        self
    }

    pub fn email(mut self) -> Self {
        self.rule = Some(FieldRule::Email);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Result of one submission pass (honeypot gate, then field validation).
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// Every field passed; proceed to the database.
    Clean,
    /// One or more fields failed; re-render the form with inline messages.
    Rejected(ErrorMap),
    /// The honeypot was filled in; abort without validating anything.
    Spam(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Clean)
    }

    /// Extract the per-field errors if validation failed.
    pub fn errors(self) -> Option<ErrorMap> {
        match self {
            ValidationOutcome::Rejected(errors) => Some(errors),
            _ => None,
        }
    }
}

/// The validation engine. Holds the message catalog and date format; build one
/// at startup and share it across requests (it is read-only).
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(crate::config::DEFAULT_CONFIG.clone())
    }

    /// Validate every field and collect one message per failing field.
    ///
    /// Per field: the required check wins and short-circuits the content rule;
    /// otherwise the rule decides; a field named `birthdate` whose rule passed
    /// additionally gets a real date parse and a not-in-the-future check.
    /// Fields are independent, so traversal order never affects the outcome.
    pub fn validate(&self, fields: &[(&str, FieldSpec)]) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for (name, spec) in fields {
            if let Some(message) = self.check_field(name, spec) {
                errors.insert((*name).to_string(), message);
            }
        }
        errors
    }

    fn check_field(&self, name: &str, spec: &FieldSpec) -> Option<String> {
        let messages = &self.config.messages;
        let value = spec.value.as_str();

        if spec.required && value.trim().is_empty() {
            return Some(messages.required.replace("{field}", &capitalize(name)));
        }

        let rule = spec.rule.as_ref()?;
        match rule {
            FieldRule::Pattern(pattern) if !pattern.is_match(value) => {
                return Some(
                    spec.error_message
                        .clone()
                        .or_else(|| messages.for_field(name).map(str::to_string))
                        .unwrap_or_else(|| messages.invalid_value.clone()),
                );
            }
            FieldRule::Email if !is_valid_email(value) => {
                return Some(
                    spec.error_message
                        .clone()
                        .unwrap_or_else(|| messages.email.clone()),
                );
            }
            _ => {}
        }

        // The rule passed. Birthdates additionally get a real date check.
        if name == "birthdate" {
            return match NaiveDate::parse_from_str(value, &self.config.date_format) {
                Err(_) => Some(messages.invalid_date_format.clone()),
                Ok(date) if date > Local::now().date_naive() => {
                    Some(messages.future_date.clone())
                }
                Ok(_) => None,
            };
        }

        None
    }

    /// Bot-detection gate, run before [`Self::validate`]. A hidden form field
    /// that legitimate users never fill; any non-empty value signals an
    /// automated submission and the whole request should be dropped.
    pub fn check_honeypot(&self, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) if !v.is_empty() => Some(self.config.messages.honeypot.clone()),
            _ => None,
        }
    }

    /// Check that an optional booking date is well-formed and not in the past,
    /// recording any failure under `field_name` in `errors`.
    ///
    /// An empty `date` is valid (the field is optional). Both dates are parsed
    /// with the configured format and compared as dates, not as strings.
    pub fn validate_future_date(
        &self,
        date: &str,
        current_date: &str,
        field_name: &str,
        errors: &mut ErrorMap,
    ) {
        if date.is_empty() {
            return;
        }

        let messages = &self.config.messages;
        let format = self.config.date_format.as_str();

        let message = match NaiveDate::parse_from_str(date, format) {
            Err(_) => Some(messages.date_format_hint.replace("{format}", format)),
            Ok(parsed) => match NaiveDate::parse_from_str(current_date, format) {
                Ok(today) if parsed < today => Some(messages.past_date.clone()),
                _ => None,
            },
        };
        if let Some(message) = message {
            errors.insert(field_name.to_string(), message);
        }
    }

    /// One full submission pass: honeypot gate first, then field validation.
    pub fn run(&self, honeypot: Option<&str>, fields: &[(&str, FieldSpec)]) -> ValidationOutcome {
        if let Some(message) = self.check_honeypot(honeypot) {
            return ValidationOutcome::Spam(message);
        }
        let errors = self.validate(fields);
        if errors.is_empty() {
            ValidationOutcome::Clean
        } else {
            ValidationOutcome::Rejected(errors)
        }
    }
}
