//! Typed field access over an untyped JSON object
//!
//! Each accessor records a message in the shared [`FieldErrors`] and returns
//! `None` when the field is unusable. Explicit `null` on an optional field
//! means "unset", the same as leaving it out.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::FieldErrors;
use crate::models::StringOrList;

pub(super) const MISSING: &str = "Missing data for required field.";
pub(super) const NULL: &str = "Field may not be null.";
pub(super) const BLANK: &str = "Field may not be blank.";

/// Borrowed JSON object plus the path it was found at
pub(super) struct Payload<'a> {
    fields: &'a Map<String, Value>,
    prefix: String,
}

enum Lookup<'a> {
    Absent,
    Null(&'static str),
    Present(&'static str, &'a Value),
}

impl<'a> Payload<'a> {
    /// Wrap `value` if it is an object, otherwise report it at `prefix`
    pub fn new(value: &'a Value, prefix: &str, errors: &mut FieldErrors) -> Option<Self> {
        match value.as_object() {
            Some(fields) => Some(Self {
                fields,
                prefix: prefix.to_string(),
            }),
            None => {
                let path = if prefix.is_empty() { "_schema" } else { prefix };
                errors.add(path, "Invalid input type.");
                None
            }
        }
    }

    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// First of `keys` present in the object; later keys are aliases
    fn lookup(&self, keys: &[&'static str]) -> Lookup<'a> {
        let mut null_key = None;
        for key in keys {
            match self.fields.get(*key) {
                Some(Value::Null) => {
                    null_key.get_or_insert(*key);
                }
                Some(value) => return Lookup::Present(*key, value),
                None => {}
            }
        }
        match null_key {
            Some(key) => Lookup::Null(key),
            None => Lookup::Absent,
        }
    }

    /// True when any of `keys` carries a non-null value
    pub fn has(&self, keys: &[&'static str]) -> bool {
        matches!(self.lookup(keys), Lookup::Present(..))
    }

    fn require(&self, keys: &[&'static str], errors: &mut FieldErrors) -> Option<(&'static str, &'a Value)> {
        match self.lookup(keys) {
            Lookup::Present(key, value) => Some((key, value)),
            Lookup::Null(key) => {
                errors.add(self.path(key), NULL);
                None
            }
            Lookup::Absent => {
                errors.add(self.path(keys[0]), MISSING);
                None
            }
        }
    }

    fn optional(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        match self.lookup(keys) {
            Lookup::Present(key, value) => Some((key, value)),
            _ => None,
        }
    }

    pub fn required_str(&self, key: &'static str, max_len: usize, errors: &mut FieldErrors) -> Option<String> {
        let (key, value) = self.require(&[key], errors)?;
        let text = self.string_value(key, value, max_len, errors)?;
        if text.trim().is_empty() {
            errors.add(self.path(key), BLANK);
            return None;
        }
        Some(text)
    }

    pub fn optional_str(
        &self,
        keys: &[&'static str],
        max_len: Option<usize>,
        errors: &mut FieldErrors,
    ) -> Option<String> {
        let (key, value) = self.optional(keys)?;
        self.string_value(key, value, max_len.unwrap_or(usize::MAX), errors)
    }

    fn string_value(&self, key: &str, value: &Value, max_len: usize, errors: &mut FieldErrors) -> Option<String> {
        let Some(text) = value.as_str() else {
            errors.add(self.path(key), "Not a valid string.");
            return None;
        };
        if text.chars().count() > max_len {
            errors.add(self.path(key), format!("Longer than maximum length {}.", max_len));
            return None;
        }
        Some(text.to_string())
    }

    /// String-or-list field, normalized to a non-empty list
    pub fn required_list(&self, key: &'static str, entry_max: usize, errors: &mut FieldErrors) -> Option<Vec<String>> {
        let (key, value) = self.require(&[key], errors)?;
        let list = self.list_value(key, value, entry_max, errors)?;
        if list.is_empty() {
            errors.add(self.path(key), "Must contain at least one entry.");
            return None;
        }
        Some(list)
    }

    /// String-or-list field, normalized to a list (may be empty)
    pub fn optional_list(
        &self,
        keys: &[&'static str],
        entry_max: usize,
        errors: &mut FieldErrors,
    ) -> Option<Vec<String>> {
        let (key, value) = self.optional(keys)?;
        self.list_value(key, value, entry_max, errors)
    }

    fn list_value(&self, key: &str, value: &Value, entry_max: usize, errors: &mut FieldErrors) -> Option<Vec<String>> {
        let list = match serde_json::from_value::<StringOrList>(value.clone()) {
            Ok(parsed) => parsed.into_list(),
            Err(_) => {
                errors.add(self.path(key), "Not a valid string or list of strings.");
                return None;
            }
        };
        let mut valid = true;
        if list.iter().any(|entry| entry.trim().is_empty()) {
            errors.add(self.path(key), "Entries may not be blank.");
            valid = false;
        }
        if list.iter().any(|entry| entry.chars().count() > entry_max) {
            errors.add(
                self.path(key),
                format!("Entry longer than maximum length {}.", entry_max),
            );
            valid = false;
        }
        valid.then_some(list)
    }

    pub fn optional_bool(&self, key: &'static str, errors: &mut FieldErrors) -> Option<bool> {
        let (key, value) = self.optional(&[key])?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                errors.add(self.path(key), "Not a valid boolean.");
                None
            }
        }
    }

    /// Integer no smaller than `min`; numeric strings are accepted
    pub fn required_count(&self, keys: &[&'static str], min: u32, errors: &mut FieldErrors) -> Option<u32> {
        let (key, value) = self.require(keys, errors)?;
        self.count_value(key, value, min, errors)
    }

    pub fn optional_count(&self, keys: &[&'static str], min: u32, errors: &mut FieldErrors) -> Option<u32> {
        let (key, value) = self.optional(keys)?;
        self.count_value(key, value, min, errors)
    }

    fn count_value(&self, key: &str, value: &Value, min: u32, errors: &mut FieldErrors) -> Option<u32> {
        let number = value
            .as_i64()
            .or_else(|| value.as_str().and_then(|text| text.trim().parse::<i64>().ok()));
        match number {
            None => {
                errors.add(self.path(key), "Not a valid integer.");
                None
            }
            Some(n) if n < i64::from(min) => {
                errors.add(
                    self.path(key),
                    format!("Must be greater than or equal to {}.", min),
                );
                None
            }
            Some(n) => match u32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.add(self.path(key), "Number too large.");
                    None
                }
            },
        }
    }

    /// Positive integer reference to another entity
    pub fn required_id(&self, key: &'static str, errors: &mut FieldErrors) -> Option<i64> {
        let (key, value) = self.require(&[key], errors)?;
        match value.as_i64() {
            Some(id) if id >= 1 => Some(id),
            Some(_) => {
                errors.add(self.path(key), "Must be greater than or equal to 1.");
                None
            }
            None => {
                errors.add(self.path(key), "Not a valid integer.");
                None
            }
        }
    }

    /// Field deserialized straight into a boundary type such as `SuggestedLength`
    pub fn required_value<T: DeserializeOwned>(
        &self,
        key: &'static str,
        invalid: &str,
        errors: &mut FieldErrors,
    ) -> Option<T> {
        let (key, value) = self.require(&[key], errors)?;
        self.typed_value(key, value, invalid, errors)
    }

    pub fn optional_value<T: DeserializeOwned>(
        &self,
        keys: &[&'static str],
        invalid: &str,
        errors: &mut FieldErrors,
    ) -> Option<T> {
        let (key, value) = self.optional(keys)?;
        self.typed_value(key, value, invalid, errors)
    }

    fn typed_value<T: DeserializeOwned>(
        &self,
        key: &str,
        value: &Value,
        invalid: &str,
        errors: &mut FieldErrors,
    ) -> Option<T> {
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(self.path(key), invalid);
                None
            }
        }
    }

    /// Nested array; absent or null reads as empty
    pub fn array(&self, key: &'static str, errors: &mut FieldErrors) -> Option<&'a [Value]> {
        match self.optional(&[key]) {
            None => Some(&[][..]),
            Some((_, Value::Array(values))) => Some(values.as_slice()),
            Some((key, _)) => {
                errors.add(self.path(key), "Not a valid list.");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_payload_reported_at_schema() {
        let mut errors = FieldErrors::new();
        assert!(Payload::new(&json!([1, 2]), "", &mut errors).is_none());
        assert!(errors.contains("_schema"));

        let mut errors = FieldErrors::new();
        assert!(Payload::new(&json!("x"), "sections[2]", &mut errors).is_none());
        assert!(errors.contains("sections[2]"));
    }

    #[test]
    fn test_required_str_missing_null_blank_and_long() {
        let value = json!({"a": null, "b": "  ", "c": "abcdef", "d": 5});
        let mut errors = FieldErrors::new();
        let payload = Payload::new(&value, "", &mut errors).unwrap();

        assert_eq!(payload.required_str("missing", 10, &mut errors), None);
        assert_eq!(payload.required_str("a", 10, &mut errors), None);
        assert_eq!(payload.required_str("b", 10, &mut errors), None);
        assert_eq!(payload.required_str("c", 3, &mut errors), None);
        assert_eq!(payload.required_str("d", 3, &mut errors), None);

        assert_eq!(errors.get("missing").unwrap(), [MISSING]);
        assert_eq!(errors.get("a").unwrap(), [NULL]);
        assert_eq!(errors.get("b").unwrap(), [BLANK]);
        assert_eq!(errors.get("c").unwrap(), ["Longer than maximum length 3."]);
        assert_eq!(errors.get("d").unwrap(), ["Not a valid string."]);
    }

    #[test]
    fn test_aliases_and_null_optional() {
        let value = json!({"overview": "text", "level": null});
        let mut errors = FieldErrors::new();
        let payload = Payload::new(&value, "", &mut errors).unwrap();

        assert_eq!(
            payload.optional_str(&["description", "overview"], None, &mut errors),
            Some("text".to_string())
        );
        assert_eq!(payload.optional_str(&["level"], Some(50), &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_counts() {
        let value = json!({"a": 15, "b": "20", "c": 0, "d": 1.5, "e": -3});
        let mut errors = FieldErrors::new();
        let payload = Payload::new(&value, "items[0]", &mut errors).unwrap();

        assert_eq!(payload.required_count(&["a"], 1, &mut errors), Some(15));
        assert_eq!(payload.required_count(&["b"], 1, &mut errors), Some(20));
        assert_eq!(payload.required_count(&["c"], 1, &mut errors), None);
        assert_eq!(payload.required_count(&["d"], 1, &mut errors), None);
        assert_eq!(payload.optional_count(&["e"], 0, &mut errors), None);

        assert!(errors.contains("items[0].c"));
        assert_eq!(errors.get("items[0].d").unwrap(), ["Not a valid integer."]);
        assert!(errors.contains("items[0].e"));
    }

    #[test]
    fn test_list_normalization() {
        let value = json!({"one": "passing", "many": ["a", "b"], "empty": [], "blank": ["a", " "]});
        let mut errors = FieldErrors::new();
        let payload = Payload::new(&value, "", &mut errors).unwrap();

        assert_eq!(
            payload.required_list("one", 100, &mut errors),
            Some(vec!["passing".to_string()])
        );
        assert_eq!(
            payload.required_list("many", 100, &mut errors),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(errors.is_empty());

        assert_eq!(payload.required_list("empty", 100, &mut errors), None);
        assert_eq!(payload.optional_list(&["empty"], 100, &mut errors), Some(vec![]));
        assert_eq!(payload.required_list("blank", 100, &mut errors), None);
        assert!(errors.contains("empty"));
        assert!(errors.contains("blank"));
    }
}
