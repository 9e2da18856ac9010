//! Field-level validation helpers
//!
//! Validators collect every failing field instead of stopping at the first,
//! so clients can fix a whole request in one round trip.

use serde::Serialize;

use crate::{Error, Result};

/// A single failing field and the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Accumulates field errors while a request is being validated
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Record the error of a field check and pass its value through
    pub fn check<T>(&mut self, field: &str, result: std::result::Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.reject(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finish validation, failing with every collected error
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }

    /// Finish validation and hand back the validated value.
    ///
    /// `value` is `None` only when some field was rejected.
    pub fn finish_with<T>(self, value: Option<T>) -> Result<T> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(Error::Validation(self.errors)),
        }
    }
}

/// Trim a required string field, rejecting missing or blank values
pub fn required_trimmed(value: Option<&str>, label: &str) -> std::result::Result<String, String> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(format!("{} is required", label)),
    }
}

/// Enforce a minimum length in characters on an already trimmed value
pub fn min_chars(value: String, min: usize, label: &str) -> std::result::Result<String, String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters long", label, min))
    } else {
        Ok(value)
    }
}

/// Loose `\S+@\S+\.\S+` email shape check
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    email.char_indices().any(|(at, ch)| {
        if ch != '@' || at == 0 {
            return false;
        }
        let domain = &email[at + 1..];
        domain
            .char_indices()
            .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_all_errors() {
        let mut validator = Validator::new();
        validator.reject("title", "Title is required");
        validator.reject("dueDate", "Due date is required");

        match validator.finish() {
            Err(Error::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "title");
                assert_eq!(errors[1].field, "dueDate");
            }
            other => panic!("Expected validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_required_trimmed() {
        assert_eq!(required_trimmed(Some("  hi "), "Name"), Ok("hi".to_string()));
        assert!(required_trimmed(Some("   "), "Name").is_err());
        assert_eq!(
            required_trimmed(None, "Name"),
            Err("Name is required".to_string())
        );
    }

    #[test]
    fn test_min_chars_counts_characters() {
        assert!(min_chars("äöü".to_string(), 3, "Title").is_ok());
        assert_eq!(
            min_chars("ab".to_string(), 3, "Title"),
            Err("Title must be at least 3 characters long".to_string())
        );
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("dev@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("dev@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("dev @example.com"));
        assert!(!is_valid_email("dev@.com"));
        assert!(!is_valid_email("dev@example."));
        assert!(!is_valid_email(""));
    }
}
