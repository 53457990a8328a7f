//! String and structural forms of compared values.
//!
//! The string form of a value follows its serde representation: a string
//! renders as-is (no quotes), `null`/absent renders as [`NULL_MARKER`], and
//! anything else renders as compact JSON. Object keys are sorted when a
//! value is lifted, so hash-ordered maps render the same on every run.

use serde::Serialize;
use serde_json::Value;

/// Token printed for an absent or null value
pub const NULL_MARKER: &str = "null";

/// Lift a value to its structural form, falling back to the serialization
/// error text so a report can always be produced.
pub fn lift<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .map(sort_keys)
        .unwrap_or_else(|err| Value::String(format!("<unrenderable: {}>", err)))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// String form of a structural value
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NULL_MARKER.to_string(),
        other => other.to_string(),
    }
}

/// String form of any serializable value
pub fn describe<T: Serialize + ?Sized>(value: &T) -> String {
    describe_value(&lift(value))
}

/// String form of an optional value; `None` renders as [`NULL_MARKER`]
pub fn describe_opt<T: Serialize + ?Sized>(value: Option<&T>) -> String {
    value.map(describe).unwrap_or_else(|| NULL_MARKER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_strings_render_raw() {
        assert_eq!(describe("Ready set"), "Ready set");
        assert_eq!(describe(&"Go".to_string()), "Go");
    }

    #[test]
    fn test_scalars_and_composites_render_compact() {
        assert_eq!(describe(&1), "1");
        assert_eq!(describe(&true), "true");
        assert_eq!(describe(&vec![1, 2]), "[1,2]");
        let map: BTreeMap<&str, i32> = [("a", 1)].into_iter().collect();
        assert_eq!(describe(&map), r#"{"a":1}"#);
    }

    #[test]
    fn test_hash_maps_render_in_key_order() {
        let map: HashMap<String, Vec<HashMap<&str, u8>>> = ('a'..='p')
            .map(|c| {
                let inner: HashMap<&str, u8> = [("z", 1), ("m", 2), ("b", 3)].into_iter().collect();
                (c.to_string(), vec![inner])
            })
            .collect();
        let rendered = describe(&map);

        let expected_inner = r#"[{"b":3,"m":2,"z":1}]"#;
        let expected = format!(
            "{{{}}}",
            ('a'..='p')
                .map(|c| format!("\"{}\":{}", c, expected_inner))
                .collect::<Vec<_>>()
                .join(",")
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_absent_and_null_use_marker() {
        assert_eq!(describe_opt::<i32>(None), "null");
        assert_eq!(describe(&Option::<i32>::None), "null");
        assert_eq!(describe(&()), "null");
    }
}
