//! Validation layer: untyped JSON payload in, normalized entity or field errors out
//!
//! Validation never stops at the first problem. Every check runs and every
//! failure lands in one [`FieldErrors`] map keyed by field path, so callers can
//! report all violations at once. Nothing here touches storage.

mod drill;
mod payload;
mod practice_plan;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use drill::validate_and_normalize_drill;
pub use practice_plan::{parse_time_of_day, validate_and_normalize_practice_plan};

/// Knobs for checks that are a deployment choice rather than a data rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Reject skill levels outside the controlled vocabulary
    pub enforce_skill_levels: bool,
}

/// Field path → messages
///
/// Paths look like `name`, `sections[0].items[2].drill_id` or
/// `sections[1].parallel_groups.<group id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", path, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_collect_per_path() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("name", "Missing data for required field.");
        errors.add("name", "Longer than maximum length 100.");
        errors.add("sections[0].order", "Duplicate section order 1.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name").unwrap().len(), 2);
        assert!(errors.contains("sections[0].order"));
        assert_eq!(
            errors.to_string(),
            "name: Missing data for required field.; name: Longer than maximum length 100.; \
             sections[0].order: Duplicate section order 1."
        );
    }

    #[test]
    fn test_field_errors_serialize_as_object() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Missing data for required field.");

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"name": ["Missing data for required field."]})
        );
    }
}
