//! Encoding normalization for decoded snapshot values.
//!
//! The snapshot producer mixes default-encoded and legacy code-page text
//! per field with no marker distinguishing them. Every ambiguous byte
//! string is resolved with a three-step chain, cheapest and most common
//! interpretation first:
//!
//! 1. strict decode with the default encoding;
//! 2. strict decode with the legacy single-byte fallback code page;
//! 3. lowercase hex of the original bytes, so no data is ever dropped.
//!
//! The transform is pure: it consumes its input and returns a new tree,
//! never mutating shared state. Values already decoded as text pass
//! through untouched, which makes the transform idempotent.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::config::EncodingConfig;
use crate::error::{GparamsError, Result};
use crate::graph::RawValue;

/// Resolved encoding chain applied to every textual field.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    default: &'static Encoding,
    fallback: &'static Encoding,
}

impl Normalizer {
    /// Resolve the configured encoding labels.
    ///
    /// # Errors
    /// Returns [`GparamsError::Config`] if either label is unknown, so bad
    /// labels surface before the walk starts rather than mid-graph.
    pub fn new(config: &EncodingConfig) -> Result<Self> {
        Ok(Self {
            default: resolve_label(&config.default)?,
            fallback: resolve_label(&config.fallback)?,
        })
    }

    /// Normalize one value tree.
    ///
    /// Byte strings (including mapping keys) become text via the chain
    /// above; non-textual scalars pass through unchanged; sequences and
    /// mappings recurse.
    #[must_use]
    pub fn normalize(&self, value: RawValue) -> RawValue {
        match value {
            RawValue::Bytes(bytes) => RawValue::Text(self.normalize_bytes(&bytes)),
            RawValue::List(items) => {
                RawValue::List(items.into_iter().map(|v| self.normalize(v)).collect())
            }
            RawValue::Map(entries) => RawValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (self.normalize(k), self.normalize(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn normalize_bytes(&self, bytes: &[u8]) -> String {
        if let Some(text) = decode_strict(self.default, bytes) {
            return text;
        }
        if let Some(text) = decode_strict(self.fallback, bytes) {
            return text;
        }
        hex_string(bytes)
    }
}

fn resolve_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| GparamsError::Config(format!("unknown encoding label '{label}'")))
}

/// Strict decode: `None` if any sequence in `bytes` is invalid in `encoding`.
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Lowercase hex of `bytes`, e.g. `[0xde, 0xad]` becomes `"dead"`.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
