//! Typed access to raw associative request input.
//!
//! Request DTOs are built from a JSON object (either a JSON body or a decoded
//! form). Browsers send every form value as a string, so numeric and boolean
//! readers accept both native JSON values and their string spellings.

use core::str::FromStr;

use serde_json::{Map, Value};

use crate::error::FieldErrors;

/// Raw associative input as received from the transport.
pub type RawInput = Map<String, Value>;

/// Read-only view over [`RawInput`] with lenient, typed getters.
///
/// Getters that can fail record a message in the supplied [`FieldErrors`]
/// and return `None`, so a DTO can report every bad field at once.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    raw: &'a RawInput,
}

impl<'a> Input<'a> {
    pub fn new(raw: &'a RawInput) -> Self {
        Self { raw }
    }

    /// Whether the field was supplied at all (an explicit `null` counts).
    pub fn has(&self, field: &str) -> bool {
        self.raw.contains_key(field)
    }

    /// Whether the field was supplied as `null` or an empty string.
    pub fn is_blank(&self, field: &str) -> bool {
        match self.raw.get(field) {
            Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed string value; empty strings and `null` read as `None`.
    pub fn string(&self, field: &str) -> Option<String> {
        match self.raw.get(field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Non-negative whole number.
    pub fn u64(&self, field: &str, errors: &mut FieldErrors) -> Option<u64> {
        let parsed = match self.raw.get(field)? {
            Value::Null => return None,
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            errors.add(field, format!("{field} must be a whole number"));
        }
        parsed
    }

    pub fn u32(&self, field: &str, errors: &mut FieldErrors) -> Option<u32> {
        let value = self.u64(field, errors)?;
        match u32::try_from(value) {
            Ok(v) => Some(v),
            Err(_) => {
                errors.add(field, format!("{field} is too large"));
                None
            }
        }
    }

    /// Decimal number.
    pub fn f64(&self, field: &str, errors: &mut FieldErrors) -> Option<f64> {
        let parsed = match self.raw.get(field)? {
            Value::Null => return None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        if parsed.is_none() {
            errors.add(field, format!("{field} must be a number"));
        }
        parsed
    }

    /// Boolean; accepts `true/false`, `1/0`, `"on"/"off"`, `"yes"/"no"`.
    pub fn bool(&self, field: &str, errors: &mut FieldErrors) -> Option<bool> {
        let parsed = match self.raw.get(field)? {
            Value::Null => return None,
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(true),
                "0" | "false" | "off" | "no" | "" => Some(false),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            errors.add(field, format!("{field} must be a boolean"));
        }
        parsed
    }

    /// Parse an identifier (or any `FromStr` value) from a string field.
    pub fn parse<T: FromStr>(&self, field: &str, errors: &mut FieldErrors) -> Option<T> {
        let raw = self.string(field)?;
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.add(field, format!("{field} is not valid"));
                None
            }
        }
    }

    /// List of strings (JSON array, or a comma separated string from a form).
    pub fn string_list(&self, field: &str) -> Option<Vec<String>> {
        match self.raw.get(field)? {
            Value::Array(values) => Some(
                values
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            Value::String(s) => Some(
                s.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Check a trimmed string's character length against inclusive bounds.
pub fn check_length(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.add(field, format!("{field} must be at least {min} characters"));
    } else if len > max {
        errors.add(field, format!("{field} must not exceed {max} characters"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawInput {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn numbers_accept_form_strings() {
        let data = raw(json!({"price": "15000", "stock": 3, "bad": "12a"}));
        let input = Input::new(&data);
        let mut errors = FieldErrors::new();

        assert_eq!(input.u64("price", &mut errors), Some(15_000));
        assert_eq!(input.u64("stock", &mut errors), Some(3));
        assert_eq!(input.u64("bad", &mut errors), None);
        assert_eq!(input.u64("missing", &mut errors), None);
        assert!(errors.contains("bad"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn blank_strings_read_as_absent_but_present() {
        let data = raw(json!({"description": "   ", "name": " Phone "}));
        let input = Input::new(&data);

        assert!(input.has("description"));
        assert!(input.is_blank("description"));
        assert_eq!(input.string("description"), None);
        assert_eq!(input.string("name").as_deref(), Some("Phone"));
    }

    #[test]
    fn booleans_accept_checkbox_spellings() {
        let data = raw(json!({"a": "on", "b": 0, "c": "maybe"}));
        let input = Input::new(&data);
        let mut errors = FieldErrors::new();

        assert_eq!(input.bool("a", &mut errors), Some(true));
        assert_eq!(input.bool("b", &mut errors), Some(false));
        assert_eq!(input.bool("c", &mut errors), None);
        assert!(errors.contains("c"));
    }

    #[test]
    fn string_lists_from_arrays_or_csv() {
        let data = raw(json!({"ids": ["a", " b ", ""], "csv": "x, y,,z"}));
        let input = Input::new(&data);

        assert_eq!(input.string_list("ids").unwrap(), vec!["a", "b"]);
        assert_eq!(input.string_list("csv").unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn length_bounds_are_inclusive() {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "name", "abc", 3, 5);
        check_length(&mut errors, "title", "abcdef", 3, 5);
        assert!(!errors.contains("name"));
        assert!(errors.contains("title"));
    }
}
