//! JSON canonicalization for the JSON comparison path.
//!
//! `expect_json` / `whenever_json` run the producer's text through a
//! [`JsonCodec`] before it is stored as the resolved value, so formatting
//! and indentation differences never reach the comparison.

use serde_json::Value;
use unitsim_errors::BoxError;

/// Reformats JSON text to one deterministic, compact representation
pub trait JsonCodec: Send + Sync {
    /// # Errors
    ///
    /// Returns the parser's error when `raw` is not valid JSON.
    fn canonicalize(&self, raw: &str) -> std::result::Result<String, BoxError>;
}

/// `serde_json` codec: parse, then re-emit compactly.
///
/// Object keys keep their source order, so a compact string written by hand
/// in the same order compares equal to a pretty-printed one. Number literals
/// are kept verbatim, never rounded through `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn canonicalize(&self, raw: &str) -> std::result::Result<String, BoxError> {
        Ok(canonicalize(raw)?)
    }
}

/// Canonicalize JSON text with [`SerdeJsonCodec`] semantics.
///
/// # Errors
///
/// Returns the parse error when `raw` is not valid JSON.
///
/// ```
/// let pretty = "{\n  \"a\": [1, 2],\n  \"b\": {\"c\": null}\n}";
/// assert_eq!(
///     unitsim_core::canonicalize(pretty).unwrap(),
///     r#"{"a":[1,2],"b":{"c":null}}"#
/// );
/// ```
pub fn canonicalize(raw: &str) -> std::result::Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    serde_json::to_string(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PRETTY: &str = r#"{
    "firstItem": "firstValue",
    "nestedObject": {
        "nestedItem": "nestedValue"
    },
    "array": [
        "item1",
        "item2"
    ]
}"#;

    const COMPACT: &str = r#"{"firstItem":"firstValue","nestedObject":{"nestedItem":"nestedValue"},"array":["item1","item2"]}"#;

    #[test]
    fn test_pretty_input_compresses_in_source_order() {
        assert_eq!(canonicalize(PRETTY).unwrap(), COMPACT);
    }

    #[test]
    fn test_codec_rejects_malformed_input() {
        let err = SerdeJsonCodec.canonicalize(r#"{"a": "#).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_scalar_documents() {
        assert_eq!(canonicalize(" 42 ").unwrap(), "42");
        assert_eq!(canonicalize("\"x\"").unwrap(), "\"x\"");
        assert_eq!(canonicalize("null").unwrap(), "null");
    }

    #[test]
    fn test_integers_beyond_u64_keep_every_digit() {
        let left = canonicalize(r#"{"id": 12345678901234567890123}"#).unwrap();
        let right = canonicalize(r#"{"id": 12345678901234567890124}"#).unwrap();
        assert_eq!(left, r#"{"id":12345678901234567890123}"#);
        assert_ne!(left, right);
    }

    #[test]
    fn test_decimals_are_not_rounded() {
        assert_eq!(
            canonicalize("[0.1000000000000000001]").unwrap(),
            "[0.1000000000000000001]"
        );
        assert_ne!(
            canonicalize("[0.1000000000000000001]").unwrap(),
            canonicalize("[0.1]").unwrap()
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_canonicalize_is_idempotent(value in arb_json()) {
            let once = canonicalize(&value.to_string()).unwrap();
            let twice = canonicalize(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_canonicalize_ignores_indentation(value in arb_json()) {
            let pretty = serde_json::to_string_pretty(&value).unwrap();
            let compact = serde_json::to_string(&value).unwrap();
            prop_assert_eq!(canonicalize(&pretty).unwrap(), canonicalize(&compact).unwrap());
        }
    }
}
