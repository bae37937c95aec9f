//! Flattening normalized values into the canonical exchange form.
//!
//! The canonical form is `serde_json::Value` with the default map
//! representation, so serialized entities always carry stable, sorted key
//! ordering. Scalars pass through, sequences flatten element-wise and
//! mappings recurse.
//!
//! Decoded values are owned acyclic trees, so visited-identity tracking
//! is unnecessary; a recursion-depth guard turns pathological nesting
//! into an error instead of a stack overflow.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{GparamsError, Result};
use crate::graph::RawValue;
use crate::normalize;

/// Flatten a normalized value tree into canonical JSON.
///
/// # Errors
/// Returns [`GparamsError::CyclicGraph`] when nesting exceeds `max_depth`,
/// and [`GparamsError::CorruptGraph`] for mapping keys with no exchange
/// representation (composite keys).
pub fn flatten(value: RawValue, max_depth: usize) -> Result<Value> {
    flatten_at(value, max_depth, 0)
}

fn flatten_at(value: RawValue, max_depth: usize, depth: usize) -> Result<Value> {
    if depth > max_depth {
        return Err(GparamsError::CyclicGraph { depth: max_depth });
    }
    match value {
        RawValue::Null => Ok(Value::Null),
        RawValue::Bool(b) => Ok(Value::Bool(b)),
        RawValue::Int(i) => Ok(Value::Number(i.into())),
        // Integers beyond i64 and non-finite floats have no JSON number
        // representation.
        RawValue::BigInt(decimal) => Ok(Value::String(decimal)),
        RawValue::Float(f) => Ok(Number::from_f64(f).map_or_else(
            || {
                debug!(value = f, "Non-finite float flattened to null");
                Value::Null
            },
            Value::Number,
        )),
        RawValue::Text(s) => Ok(Value::String(s)),
        // Normalization precedes flattening in the pipeline; stray bytes
        // from other callers get the same escape the normalizer uses.
        RawValue::Bytes(bytes) => Ok(Value::String(normalize::hex_string(&bytes))),
        RawValue::List(items) => items
            .into_iter()
            .map(|item| flatten_at(item, max_depth, depth + 1))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        RawValue::Map(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(object_key(key)?, flatten_at(value, max_depth, depth + 1)?);
            }
            Ok(Value::Object(object))
        }
    }
}

/// Exchange-format object keys are strings; scalar keys are stringified
/// the way the producer's own serializer renders them.
fn object_key(key: RawValue) -> Result<String> {
    match key {
        RawValue::Text(s) => Ok(s),
        RawValue::Bytes(bytes) => Ok(normalize::hex_string(&bytes)),
        RawValue::Int(i) => Ok(i.to_string()),
        RawValue::BigInt(decimal) => Ok(decimal),
        RawValue::Float(f) => Ok(f.to_string()),
        RawValue::Bool(b) => Ok(if b { "true" } else { "false" }.to_string()),
        RawValue::Null => Ok("null".to_string()),
        RawValue::List(_) | RawValue::Map(_) => Err(GparamsError::CorruptGraph(
            "composite mapping key has no exchange representation".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEPTH: usize = 128;

    #[test]
    fn scalars_pass_through() {
        assert_eq!(flatten(RawValue::Null, DEPTH).expect("flatten"), json!(null));
        assert_eq!(flatten(RawValue::Bool(true), DEPTH).expect("flatten"), json!(true));
        assert_eq!(flatten(RawValue::Int(-3), DEPTH).expect("flatten"), json!(-3));
        assert_eq!(flatten(RawValue::Float(2.5), DEPTH).expect("flatten"), json!(2.5));
        assert_eq!(
            flatten(RawValue::Text("Cruiser".into()), DEPTH).expect("flatten"),
            json!("Cruiser")
        );
    }

    #[test]
    fn nested_structure_flattens() {
        let value = RawValue::Map(vec![
            (
                RawValue::Text("typeinfo".into()),
                RawValue::Map(vec![(
                    RawValue::Text("type".into()),
                    RawValue::Text("Ship".into()),
                )]),
            ),
            (
                RawValue::Text("guns".into()),
                RawValue::List(vec![RawValue::Int(127), RawValue::Int(130)]),
            ),
        ]);
        assert_eq!(
            flatten(value, DEPTH).expect("flatten"),
            json!({"typeinfo": {"type": "Ship"}, "guns": [127, 130]})
        );
    }

    #[test]
    fn serialized_keys_are_sorted() {
        let value = RawValue::Map(vec![
            (RawValue::Text("zulu".into()), RawValue::Int(1)),
            (RawValue::Text("alpha".into()), RawValue::Int(2)),
        ]);
        let text = serde_json::to_string(&flatten(value, DEPTH).expect("flatten")).expect("json");
        assert_eq!(text, r#"{"alpha":2,"zulu":1}"#);
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let value = RawValue::Map(vec![
            (RawValue::Int(1), RawValue::Text("one".into())),
            (RawValue::Bool(true), RawValue::Text("yes".into())),
            (RawValue::Null, RawValue::Text("none".into())),
        ]);
        assert_eq!(
            flatten(value, DEPTH).expect("flatten"),
            json!({"1": "one", "true": "yes", "null": "none"})
        );
    }

    #[test]
    fn composite_key_is_rejected() {
        let value = RawValue::Map(vec![(
            RawValue::List(vec![RawValue::Int(1)]),
            RawValue::Int(2),
        )]);
        let err = flatten(value, DEPTH).expect_err("must fail");
        assert!(matches!(err, GparamsError::CorruptGraph(_)));
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(
            flatten(RawValue::Float(f64::INFINITY), DEPTH).expect("flatten"),
            json!(null)
        );
        assert_eq!(
            flatten(RawValue::Float(f64::NAN), DEPTH).expect("flatten"),
            json!(null)
        );
    }

    #[test]
    fn depth_guard_fires() {
        let mut value = RawValue::Int(0);
        for _ in 0..10 {
            value = RawValue::List(vec![value]);
        }
        let err = flatten(value, 5).expect_err("must fail");
        assert!(matches!(err, GparamsError::CyclicGraph { depth: 5 }));
    }

    #[test]
    fn bounded_depth_terminates() {
        let mut value = RawValue::Text("leaf".into());
        for _ in 0..100 {
            value = RawValue::List(vec![value]);
        }
        assert!(flatten(value, DEPTH).is_ok());
    }
}
