//! The sequential rebuild pipeline.
//!
//! Flow: read + reverse, inflate, deserialize, normalize, flatten,
//! partition, write. Each stage starts only after the prior stage's
//! complete output is available; nothing pipelines or overlaps. The first
//! error aborts the run. Partitions already committed remain in the
//! store, but no partition is ever left half-written.
//!
//! The whole decoded graph and its canonical form are held in memory for
//! the entire run; peak memory is proportional to decompressed snapshot
//! size.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::RebuildConfig;
use crate::error::{GparamsError, Result};
use crate::flatten;
use crate::graph;
use crate::normalize::Normalizer;
use crate::partition::{self, Partition};
use crate::snapshot;
use crate::store::StoreWriter;

/// Summary of one completed rebuild run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Total number of entities written.
    pub entities: usize,
    /// Per-partition row counts, in first-seen tag order.
    pub partitions: Vec<(String, usize)>,
}

/// Run the full snapshot-to-store rebuild described by `config`.
///
/// # Errors
/// Fails fast with the first stage error; see [`GparamsError`] for the
/// per-stage taxonomy.
pub fn rebuild(config: &RebuildConfig) -> Result<RebuildReport> {
    let normalizer = Normalizer::new(&config.encoding)?;
    let start = Instant::now();

    info!(path = %config.snapshot.path.display(), "Reading snapshot");
    let reversed = snapshot::read_reversed(&config.snapshot.path)?;

    info!(bytes = reversed.len(), "Decompressing snapshot");
    let stream = snapshot::inflate(&reversed)?;

    info!(bytes = stream.len(), "Deserializing object graph");
    let raw = graph::deserialize_root(&stream)?;

    info!("Normalizing text encodings");
    let normalized = normalizer.normalize(raw);

    info!("Flattening to canonical form");
    let canonical = flatten::flatten(normalized, config.flatten.max_depth)?;
    let entities = into_entities(canonical)?;

    info!(entities = entities.len(), "Discovering entity types");
    let partitions = partition::partition(&entities)?;

    info!(
        partitions = partitions.len(),
        path = %config.store.path.display(),
        "Writing store"
    );
    let mut store = StoreWriter::open(&config.store)?;
    let report = write_partitions(&mut store, &partitions, &entities)?;

    info!(
        entities = report.entities,
        partitions = report.partitions.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Rebuild complete"
    );
    Ok(report)
}

/// Split the canonical snapshot root into `(key, entity)` pairs.
fn into_entities(canonical: Value) -> Result<Vec<(String, Value)>> {
    match canonical {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(GparamsError::CorruptGraph(
            "snapshot root is not a mapping".to_string(),
        )),
    }
}

/// Serialize and write every partition, one transaction per tag.
fn write_partitions(
    store: &mut StoreWriter,
    partitions: &[Partition],
    entities: &[(String, Value)],
) -> Result<RebuildReport> {
    let index: HashMap<&str, &Value> = entities
        .iter()
        .map(|(key, entity)| (key.as_str(), entity))
        .collect();

    let mut report = RebuildReport {
        entities: 0,
        partitions: Vec::with_capacity(partitions.len()),
    };
    for partition in partitions {
        let start = Instant::now();
        let mut rows = Vec::with_capacity(partition.keys.len());
        for key in &partition.keys {
            let Some(entity) = index.get(key.as_str()) else {
                // Keys come from the same scan that built the index.
                return Err(GparamsError::CorruptGraph(format!(
                    "entity '{key}' vanished between partitioning and write"
                )));
            };
            let value = serde_json::to_string(entity)
                .map_err(|e| GparamsError::Serialization(e.to_string()))?;
            rows.push((key.clone(), value));
        }
        store.rebuild_partition(&partition.tag, &rows)?;

        debug!(
            partition = %partition.tag,
            rows = rows.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Partition written"
        );
        report.entities += rows.len();
        report.partitions.push((partition.tag.clone(), rows.len()));
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
