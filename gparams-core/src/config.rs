//! Configuration for a rebuild run.
//!
//! Maps directly to `gparams.toml`. Every field has a default, so an empty
//! file (or no file at all) describes a complete run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level rebuild configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RebuildConfig {
    /// Snapshot input settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Text-encoding normalization settings.
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// Graph flattening limits.
    #[serde(default)]
    pub flatten: FlattenConfig,
    /// Persisted store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl RebuildConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `GparamsError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::GparamsError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Snapshot input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Path to the compressed, byte-reversed snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

/// Encoding chain applied to ambiguous byte strings.
///
/// Labels are WHATWG encoding labels resolved through `encoding_rs`.
/// The producer mixes default-encoded and legacy code-page text per field
/// with no marker distinguishing them; the chain tries the cheapest and
/// most common interpretation first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Label of the default text encoding.
    #[serde(default = "default_encoding_label")]
    pub default: String,
    /// Label of the legacy single-byte fallback code page.
    #[serde(default = "default_fallback_label")]
    pub fallback: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            default: default_encoding_label(),
            fallback: default_fallback_label(),
        }
    }
}

/// Graph flattening limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Maximum nesting depth accepted before flattening aborts.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Persisted store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Use WAL mode so downstream readers are not blocked mid-rebuild.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            wal_mode: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("GameParams.data")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("GameParams.db")
}
fn default_encoding_label() -> String {
    "utf-8".to_string()
}
fn default_fallback_label() -> String {
    "x-mac-cyrillic".to_string()
}
fn default_max_depth() -> usize {
    128
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
