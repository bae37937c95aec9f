//! Object-graph deserialization into a generic tagged value tree.
//!
//! The snapshot payload is a Python pickle stream produced by the game
//! tooling. The producer's serialization is treated as a black-box
//! capability: whatever shape it emits is decoded into [`RawValue`], a
//! small tagged union of scalars, sequences and mappings, without any
//! schema assumptions.
//!
//! Byte strings whose text encoding the producer left ambiguous are kept
//! as [`RawValue::Bytes`]; resolving them is the normalizer's job. This
//! keeps deserialization lossless and free of in-place mutation.

use serde_pickle::{DeOptions, HashableValue, Value};
use tracing::debug;

use crate::error::{GparamsError, Result};

/// A decoded graph node with an arbitrary, producer-defined shape.
///
/// Owned tree: cyclic references are unrepresentable by construction.
/// All producer sequence shapes (list, tuple, set, frozenset) collapse to
/// [`RawValue::List`]; integers that do not fit `i64` are carried as
/// decimal strings in [`RawValue::BigInt`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Machine-word integer.
    Int(i64),
    /// Arbitrary-precision integer, as decimal text.
    BigInt(String),
    /// Floating-point scalar.
    Float(f64),
    /// Byte string with an undetermined text encoding.
    Bytes(Vec<u8>),
    /// Text already valid in the default encoding.
    Text(String),
    /// Ordered sequence.
    List(Vec<RawValue>),
    /// Mapping, in producer order.
    Map(Vec<(RawValue, RawValue)>),
}

/// Deserialize a decompressed snapshot stream into a raw value tree.
///
/// # Errors
/// Returns [`GparamsError::CorruptGraph`] on a malformed byte stream.
pub fn deserialize(stream: &[u8]) -> Result<RawValue> {
    let value = serde_pickle::value_from_slice(stream, DeOptions::new())
        .map_err(|e| GparamsError::CorruptGraph(e.to_string()))?;
    Ok(convert(value))
}

/// Deserialize and require the top-level value to be a mapping of entities.
///
/// # Errors
/// Returns [`GparamsError::CorruptGraph`] on a malformed stream or when the
/// root is not a mapping.
pub fn deserialize_root(stream: &[u8]) -> Result<RawValue> {
    let root = deserialize(stream)?;
    match root {
        RawValue::Map(ref entries) => {
            debug!(entities = entries.len(), "Object graph deserialized");
            Ok(root)
        }
        _ => Err(GparamsError::CorruptGraph(
            "snapshot root is not a mapping".to_string(),
        )),
    }
}

fn convert(value: Value) -> RawValue {
    match value {
        Value::None => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(b),
        Value::I64(i) => RawValue::Int(i),
        Value::Int(big) => convert_bigint(&big.to_string()),
        Value::F64(f) => RawValue::Float(f),
        Value::Bytes(bytes) => RawValue::Bytes(bytes),
        Value::String(s) => RawValue::Text(s),
        Value::List(items) | Value::Tuple(items) => {
            RawValue::List(items.into_iter().map(convert).collect())
        }
        Value::Set(items) | Value::FrozenSet(items) => {
            RawValue::List(items.into_iter().map(convert_key).collect())
        }
        Value::Dict(entries) => RawValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (convert_key(k), convert(v)))
                .collect(),
        ),
    }
}

fn convert_key(key: HashableValue) -> RawValue {
    match key {
        HashableValue::None => RawValue::Null,
        HashableValue::Bool(b) => RawValue::Bool(b),
        HashableValue::I64(i) => RawValue::Int(i),
        HashableValue::Int(big) => convert_bigint(&big.to_string()),
        HashableValue::F64(f) => RawValue::Float(f),
        HashableValue::Bytes(bytes) => RawValue::Bytes(bytes),
        HashableValue::String(s) => RawValue::Text(s),
        HashableValue::Tuple(items) => {
            RawValue::List(items.into_iter().map(convert_key).collect())
        }
        HashableValue::FrozenSet(items) => {
            RawValue::List(items.into_iter().map(convert_key).collect())
        }
    }
}

fn convert_bigint(decimal: &str) -> RawValue {
    match decimal.parse::<i64>() {
        Ok(i) => RawValue::Int(i),
        Err(_) => RawValue::BigInt(decimal.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
