// File: src/config.rs
// Purpose: Message catalog and date-format configuration for the validator

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Default chrono format for every date field (birthdate, check-in, check-out).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Catalog of default error messages.
///
/// `required` is a template where `{field}` is replaced with the capitalized
/// field name, and `date_format_hint` interpolates `{format}` with the
/// configured date format. `fields` holds per-field defaults keyed by field
/// name, consulted when a pattern rule fails without a custom message.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub required: String,
    pub email: String,
    pub password: String,
    pub invalid_value: String,
    pub invalid_date_format: String,
    pub future_date: String,
    pub past_date: String,
    pub date_format_hint: String,
    pub honeypot: String,
    pub fields: HashMap<String, String>,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            required: "{field} is required.".to_string(),
            email: "Please enter a valid email address.".to_string(),
            password: "Password must be at least 8 characters and contain a letter and a digit.".to_string(),
            invalid_value: "Invalid value.".to_string(),
            invalid_date_format: "Invalid date format.".to_string(),
            future_date: "The date cannot be in the future.".to_string(),
            past_date: "Invalid date. The date cannot be in the past.".to_string(),
            date_format_hint: "Invalid date. Use the format {format}.".to_string(),
            honeypot: "Invalid submission.".to_string(),
            fields: HashMap::new(),
        }
    }
}

impl ErrorMessages {
    /// Default message for a pattern failure on the named field.
    ///
    /// Per-field catalog entries win; the password message is the built-in
    /// fallback for the `password` field so a bare pattern rule on it still
    /// produces a useful hint.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .or((field == "password").then_some(self.password.as_str()))
    }
}

/// Validator configuration: message catalog plus the date format used for all
/// date parsing. Read-only after construction; build one at startup and share
/// it freely across requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub date_format: String,
    pub messages: ErrorMessages,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            messages: ErrorMessages::default(),
        }
    }
}

impl ValidationConfig {
    /// Load a config from TOML, falling back to the defaults for anything the
    /// document leaves out. This is how deployments override message wording
    /// (or localize it).
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Process-wide default config for callers that never customize messages.
pub static DEFAULT_CONFIG: Lazy<ValidationConfig> = Lazy::new(ValidationConfig::default);
