//! Per-account settings.
//!
//! Values are stored in serialized string form: structured values as their
//! JSON text, scalars as their plain string form. A stored value that
//! parses as JSON reads back structured; anything else reads back as the
//! raw string.

use serde_json::Value;
use std::collections::BTreeMap;
use taakl_store::AccountData;

/// Reads the full settings map, decoding structured values.
pub(crate) fn get_settings(data: &AccountData) -> BTreeMap<String, Value> {
    data.settings
        .iter()
        .map(|(key, raw)| (key.clone(), decode_value(raw)))
        .collect()
}

/// Upserts each given key; keys not mentioned keep their prior values.
pub(crate) fn save_settings(data: &mut AccountData, settings: &BTreeMap<String, Value>) {
    for (key, value) in settings {
        data.settings.insert(key.clone(), encode_value(value));
    }
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
