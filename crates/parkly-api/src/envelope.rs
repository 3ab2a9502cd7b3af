// List-response envelope normalization.
//
// Collection endpoints answer either with a bare JSON array or with an
// object wrapping the array under `data`. Anything else is an empty list.

use serde_json::Value;

/// Flatten a list response into its records.
pub fn normalize_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwrap a single-record response that may also be wrapped in `data`.
pub fn normalize_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array_passes_through() {
        assert_eq!(normalize_list(json!([{"id": 1}, {"id": 2}])).len(), 2);
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        assert_eq!(normalize_list(json!({"data": [{"id": 1}]})), vec![json!({"id": 1})]);
    }

    #[test]
    fn object_without_data_is_empty() {
        assert!(normalize_list(json!({"total": 3})).is_empty());
        assert!(normalize_list(json!({"data": {"id": 1}})).is_empty());
        assert!(normalize_list(Value::Null).is_empty());
        assert!(normalize_list(json!("nope")).is_empty());
    }

    #[test]
    fn record_envelope_is_unwrapped_only_when_alone() {
        assert_eq!(normalize_record(json!({"data": {"id": 7}})), json!({"id": 7}));
        let plain = json!({"id": 7, "data": "x"});
        assert_eq!(normalize_record(plain.clone()), plain);
    }
}
