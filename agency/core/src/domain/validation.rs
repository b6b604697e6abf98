// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Request Validation
//!
//! Field-level checks that run before any store operation. A failed check
//! records one reason per field (the first one wins) and the whole payload is
//! rejected without side effects.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field name → violation reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: String, reason: String) {
        self.0.entry(field).or_insert(reason);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, reason) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field, reason)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: impl Into<String>, reason: impl Into<String>) {
        if !ok {
            self.errors.insert(field.into(), reason.into());
        }
    }

    /// Folds the errors of a nested payload under `prefix`, e.g. `targets[1].name`.
    pub fn merge_nested(&mut self, prefix: &str, nested: ValidationErrors) {
        for (field, reason) in nested.0 {
            self.errors.insert(format!("{}.{}", prefix, field), reason);
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Check for identifiers taken from the request path
pub fn validate_id(id: i64) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.check(id != 0, "id", "id can't be zero");
    v.check(id > 0, "id", "must be positive");
    v.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_id_must_be_positive() {
        assert!(validate_id(3).is_ok());
        assert_eq!(validate_id(0).unwrap_err().get("id"), Some("id can't be zero"));
        assert_eq!(validate_id(-2).unwrap_err().get("id"), Some("must be positive"));
    }

    #[test]
    fn test_first_reason_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "name", "can't be empty");
        v.check(false, "name", "too short");
        v.check(true, "breed", "invalid breed");

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("can't be empty"));
    }

    #[test]
    fn test_nested_errors_are_prefixed() {
        let mut inner = Validator::new();
        inner.check(false, "country", "can't be empty");

        let mut v = Validator::new();
        v.merge_nested("targets[2]", inner.finish().unwrap_err());

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("targets[2].country"), Some("can't be empty"));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut v = Validator::new();
        v.check(false, "salary", "must be positive");
        let errors = v.finish().unwrap_err();

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"salary": "must be positive"}));
    }
}
