//! Field-keyed validation errors

use serde::Serialize;
use std::collections::BTreeMap;

/// Accumulated validation failures, keyed by field name.
///
/// Handlers collect failures across all fields before rejecting, so the
/// client sees every problem in one response rather than one per round trip.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field. The first failure per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    /// Finish validation: `Err(self)` if anything was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Require a non-empty value after trimming.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
        }
    }

    /// Reject values longer than `max` characters.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {max} characters"));
        }
    }

    /// Reject values shorter than `min` characters.
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.add(field, format!("must be at least {min} characters"));
        }
    }

    /// Shallow shape check for email addresses.
    ///
    /// Deliverability is not checkable here; this only rejects values that
    /// cannot possibly be addresses.
    pub fn email(&mut self, field: &str, value: &str) {
        let trimmed = value.trim();
        let well_formed = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        };
        if !well_formed {
            self.add(field, "must be a valid email address");
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_is_ok() {
        let errors = ValidationErrors::new();
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_require() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "  ");
        errors.require("body", "hello");
        assert_eq!(errors.get("title"), Some("must not be empty"));
        assert!(errors.get("body").is_none());
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_first_failure_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.require("name", "");
        errors.max_len("name", &"x".repeat(300), 100);
        assert_eq!(errors.get("name"), Some("must not be empty"));
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("a@b.co", true)]
    #[case("not-an-email", false)]
    #[case("@example.com", false)]
    #[case("user@nodot", false)]
    #[case("user@.com", false)]
    fn test_email_shape(#[case] input: &str, #[case] ok: bool) {
        let mut errors = ValidationErrors::new();
        errors.email("email", input);
        assert_eq!(errors.is_empty(), ok, "input: {input}");
    }

    #[test]
    fn test_length_bounds() {
        let mut errors = ValidationErrors::new();
        errors.max_len("title", &"x".repeat(10), 5);
        errors.min_len("password", "abc", 8);
        assert!(errors.get("title").is_some());
        assert!(errors.get("password").is_some());
    }
}
