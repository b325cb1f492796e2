//! Validation helpers used by the model input types.

use crate::changeset::{ValidationCode, ValidationError, ValidationErrors};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Company handles are lowercase slugs.
pub const HANDLE_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

/// Returns `true` if `value` matches the provided regex `pattern`.
///
/// # Panics
/// Panics if `pattern` is not a valid regex. This is considered a developer
/// configuration error.
pub fn regex_is_match(pattern: &'static str, value: &str) -> bool {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, regex::Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    let regex = {
        let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(re) = cache.get(pattern) {
            re.clone()
        } else {
            let re = regex::Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid regex pattern: {pattern:?}: {e}"));
            cache.insert(pattern, re.clone());
            re
        }
    };

    regex.is_match(value)
}

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

pub fn is_handle(s: &str) -> bool {
    regex_is_match(HANDLE_PATTERN, s)
}

// ==================== Field checks ====================

pub(crate) fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(
            field,
            ValidationCode::Required,
            format!("{field} must not be empty"),
        ));
    }
}

pub(crate) fn non_negative(errors: &mut ValidationErrors, field: &str, value: Option<i32>) {
    if let Some(v) = value {
        if v < 0 {
            errors.push(ValidationError::new(
                field,
                ValidationCode::Range,
                format!("{field} must be >= 0, got {v}"),
            ));
        }
    }
}

/// Equity is a fraction of the company: `0 <= equity <= 1`.
pub(crate) fn fraction(errors: &mut ValidationErrors, field: &str, value: Option<Decimal>) {
    if let Some(v) = value {
        if v < Decimal::ZERO || v > Decimal::ONE {
            errors.push(ValidationError::new(
                field,
                ValidationCode::Range,
                format!("{field} must be between 0 and 1, got {v}"),
            ));
        }
    }
}

pub(crate) fn url(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !is_url(v) {
            errors.push(ValidationError::new(
                field,
                ValidationCode::Url,
                format!("{field} is not a valid URL"),
            ));
        }
    }
}

pub(crate) fn handle(errors: &mut ValidationErrors, field: &str, value: &str) {
    if !is_handle(value) {
        errors.push(ValidationError::new(
            field,
            ValidationCode::Pattern,
            format!("{field} must be a lowercase slug (letters, digits, dashes)"),
        ));
    }
}
