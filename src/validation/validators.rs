// File: src/validation/validators.rs
// Purpose: Leaf predicates and input sanitizers used by the validation engine

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// Characters legal in an email address besides alphanumerics.
const EMAIL_EXTRA_CHARS: &str = "!#$%&'*+-=?^_`{|}~@.[]";

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Named sanitize filter applied after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeFilter {
    /// Strip characters that cannot appear in an email address.
    Email,
}

/// Trim surrounding whitespace, then apply the named filter when given.
///
/// Every raw form value goes through this before it enters a `FieldSpec`.
/// Idempotent: sanitizing an already-sanitized value is a no-op.
pub fn sanitize(input: &str, filter: Option<SanitizeFilter>) -> String {
    let trimmed = input.trim();
    match filter {
        Some(SanitizeFilter::Email) => trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || EMAIL_EXTRA_CHARS.contains(*c))
            .collect(),
        None => trimmed.to_string(),
    }
}

/// Trim one value, strip markup tags, and escape HTML metacharacters.
///
/// For values headed into storage and later page rendering. Escaping is not
/// idempotent (`&` becomes `&amp;`), so apply it exactly once per submission.
pub fn strip_markup(input: &str) -> String {
    let stripped = TAG_REGEX.replace_all(input.trim(), "");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Run [`strip_markup`] over every value of a raw submission map.
pub fn sanitize_all(fields: &HashMap<String, String>) -> HashMap<String, String> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), strip_markup(value)))
        .collect()
}

/// Uppercase the first character, for message interpolation ("Name is required.").
pub(crate) fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
