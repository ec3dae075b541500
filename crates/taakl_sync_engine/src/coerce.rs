//! Lenient readers for client-supplied payload values.
//!
//! Legacy clients are loose about JSON types: a priority may arrive as `3`
//! or `"3"`, a flag as `true`, `1`, or `"1"`. These readers accept every
//! form the original clients produce; anything unreadable is treated as
//! absent.

use serde_json::Value;
use taakl_model::Timestamp;

/// Reads a string; numbers are rendered to their string form.
pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a string, mapping null and the empty string to `None`.
pub(crate) fn as_nonempty_string(value: &Value) -> Option<String> {
    as_string(value).filter(|s| !s.is_empty())
}

/// Reads an integer from a number or a numeric string.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a float from a number or a numeric string.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a flag from a bool, a number, or a stringly-typed flag.
pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an ordered list of identifier strings.
pub(crate) fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(as_string).collect())
}

/// Reads a wire-format timestamp.
pub(crate) fn as_timestamp(value: &Value) -> Option<Timestamp> {
    value.as_str().and_then(|s| Timestamp::parse(s).ok())
}

/// Serializes a structured value into its opaque blob form.
///
/// Null is "field not given", never an empty blob.
pub(crate) fn as_blob(value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    serde_json::to_string(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_and_numbers_read_as_strings() {
        assert_eq!(as_string(&json!("new")), Some("new".into()));
        assert_eq!(as_string(&json!(5)), Some("5".into()));
        assert_eq!(as_string(&json!(null)), None);
        assert_eq!(as_string(&json!({})), None);
    }

    #[test]
    fn flags_accept_every_legacy_form() {
        for truthy in [json!(true), json!(1), json!("1"), json!("true")] {
            assert_eq!(as_bool(&truthy), Some(true));
        }
        for falsy in [json!(false), json!(0), json!("0"), json!("")] {
            assert_eq!(as_bool(&falsy), Some(false));
        }
        assert_eq!(as_bool(&json!("maybe")), None);
    }

    #[test]
    fn numbers_accept_stringly_form() {
        assert_eq!(as_i64(&json!("42")), Some(42));
        assert_eq!(as_i64(&json!(42)), Some(42));
        assert_eq!(as_f64(&json!("1.5")), Some(1.5));
        assert_eq!(as_i64(&json!("x")), None);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        assert_eq!(as_nonempty_string(&json!("")), None);
        assert_eq!(as_nonempty_string(&json!(null)), None);
        assert_eq!(as_nonempty_string(&json!("due")), Some("due".into()));
    }

    #[test]
    fn blobs_preserve_structure() {
        assert_eq!(as_blob(&json!({"a": 1})), Some("{\"a\":1}".into()));
        assert_eq!(as_blob(&json!(null)), None);
    }
}
