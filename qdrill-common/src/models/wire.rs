//! Boundary value shapes that accept more than one JSON form

use serde::{Deserialize, Serialize};

/// A field that clients may send either as one string or as a list of strings
///
/// Only the validation layer sees this type; everything past it works with
/// `Vec<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Normalize to a list; a scalar becomes a one-element list
    pub fn into_list(self) -> Vec<String> {
        match self {
            StringOrList::One(value) => vec![value],
            StringOrList::Many(values) => values,
        }
    }
}

/// Inclusive `{min, max}` range of positive integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    /// Range bounds problem, if any
    pub fn check(&self) -> Option<String> {
        if self.min < 1 {
            Some("Range minimum must be greater than or equal to 1.".to_string())
        } else if self.min > self.max {
            Some(format!(
                "Range minimum {} is greater than maximum {}.",
                self.min, self.max
            ))
        } else {
            None
        }
    }
}

/// Suggested drill length: free text ("10-15 minutes") or a minute range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestedLength {
    Range(Range),
    Text(String),
}

/// Number of people a drill needs: an exact count or a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeopleCount {
    Exact(u32),
    Range(Range),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_or_list_accepts_both_forms() {
        let one: StringOrList = serde_json::from_value(json!("passing")).unwrap();
        assert_eq!(one.into_list(), vec!["passing".to_string()]);

        let many: StringOrList = serde_json::from_value(json!(["passing", "catching"])).unwrap();
        assert_eq!(many.into_list(), vec!["passing".to_string(), "catching".to_string()]);
    }

    #[test]
    fn test_string_or_list_rejects_numbers() {
        assert!(serde_json::from_value::<StringOrList>(json!(5)).is_err());
        assert!(serde_json::from_value::<StringOrList>(json!(["a", 5])).is_err());
    }

    #[test]
    fn test_suggested_length_forms() {
        let range: SuggestedLength = serde_json::from_value(json!({"min": 5, "max": 10})).unwrap();
        assert_eq!(range, SuggestedLength::Range(Range { min: 5, max: 10 }));

        let text: SuggestedLength = serde_json::from_value(json!("10-15 minutes")).unwrap();
        assert_eq!(text, SuggestedLength::Text("10-15 minutes".to_string()));

        // Serializes back to the same shape it was read from
        assert_eq!(serde_json::to_value(&range).unwrap(), json!({"min": 5, "max": 10}));
    }

    #[test]
    fn test_range_check() {
        assert_eq!(Range { min: 5, max: 10 }.check(), None);
        assert_eq!(Range { min: 7, max: 7 }.check(), None);
        assert!(Range { min: 0, max: 10 }.check().is_some());
        assert!(Range { min: 12, max: 10 }.check().is_some());
    }
}
