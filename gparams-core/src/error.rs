//! Error types for the gparams pipeline.

use thiserror::Error;

/// Top-level error type for all gparams operations.
///
/// Every variant is fatal: the pipeline is deterministic, so a failure
/// indicates a corrupted or incompatible input (or an upstream
/// data-integrity defect), never a transient condition. Nothing retries.
#[derive(Error, Debug)]
pub enum GparamsError {
    /// Snapshot file is missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reversed buffer is not a valid compressed stream.
    #[error("Decompression failed: {0}")]
    Decompress(String),

    /// The decompressed byte stream is not a well-formed object graph.
    #[error("Corrupt object graph: {0}")]
    CorruptGraph(String),

    /// Flattening exceeded the recursion guard. Decoded values are owned
    /// trees, so this signals pathological nesting rather than true
    /// cyclic references, which the representation cannot express.
    #[error("Recursion limit of {depth} exceeded while flattening the object graph")]
    CyclicGraph {
        /// The depth limit that was exceeded.
        depth: usize,
    },

    /// An entity carries no `typeinfo.type` discriminator.
    #[error("Entity '{key}' has no typeinfo.type discriminator")]
    MissingTypeTag {
        /// Key of the offending entity.
        key: String,
    },

    /// Two entities in the same partition share an entity key.
    #[error("Duplicate entity key '{key}' in partition '{partition}'")]
    DuplicateKey {
        /// Partition (type tag) the collision occurred in.
        partition: String,
        /// The colliding entity key.
        key: String,
    },

    /// SQLite store error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Canonical-form serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GparamsError>;
