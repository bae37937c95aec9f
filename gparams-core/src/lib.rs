//! # gparams core
//!
//! Rebuilds a type-partitioned, queryable SQLite store from a compressed,
//! byte-reversed snapshot of game-configuration entities (ships, weapons,
//! consumables).
//!
//! The pipeline is strictly sequential, each stage consuming the previous
//! stage's complete output:
//!
//! 1. [`snapshot::read_reversed`] reads the whole file and reverses byte order
//! 2. [`snapshot::inflate`] applies zlib decompression
//! 3. [`graph::deserialize_root`] decodes the serialized object graph
//! 4. [`normalize::Normalizer`] resolves encoding-ambiguous byte strings
//! 5. [`flatten::flatten`] produces the canonical sorted-key JSON form
//! 6. [`partition::partition`] discovers entity types at `typeinfo.type`
//! 7. [`store::StoreWriter`] drops, recreates and repopulates one table per type
//!
//! Every run is a full rebuild from the raw snapshot; nothing is migrated
//! or updated in place. The run either completes or aborts on the first
//! error, leaving already-committed partitions intact and no partition
//! half-written.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod normalize;
pub mod partition;
pub mod rebuild;
pub mod snapshot;
pub mod store;

pub use config::RebuildConfig;
pub use error::{GparamsError, Result};
pub use graph::RawValue;
pub use rebuild::{RebuildReport, rebuild};
