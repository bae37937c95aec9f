//! Type discovery: grouping entities by their `typeinfo.type` discriminator.
//!
//! The set of type tags is not known ahead of time; it is discovered by
//! scanning every entity in the run. Groups keep first-seen order so the
//! store writes (and the run report) are deterministic for a given
//! snapshot.

use serde_json::Value;
use tracing::debug;

use crate::error::{GparamsError, Result};

/// One discovered partition: a type tag and the entity keys that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// The discriminator string found at `typeinfo.type`.
    pub tag: String,
    /// Entity keys, in scan order.
    pub keys: Vec<String>,
}

/// Group entity keys by type tag, in first-seen order.
///
/// # Errors
/// Returns [`GparamsError::MissingTypeTag`] if any entity lacks a string
/// discriminator at `typeinfo.type`.
pub fn partition(entities: &[(String, Value)]) -> Result<Vec<Partition>> {
    let mut partitions: Vec<Partition> = Vec::new();
    for (key, entity) in entities {
        let tag = type_tag(entity).ok_or_else(|| GparamsError::MissingTypeTag {
            key: key.clone(),
        })?;
        match partitions.iter().position(|p| p.tag == tag) {
            Some(i) => partitions[i].keys.push(key.clone()),
            None => partitions.push(Partition {
                tag: tag.to_string(),
                keys: vec![key.clone()],
            }),
        }
    }
    debug!(
        entities = entities.len(),
        partitions = partitions.len(),
        "Entity types discovered"
    );
    Ok(partitions)
}

fn type_tag(entity: &Value) -> Option<&str> {
    entity.get("typeinfo")?.get("type")?.as_str()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(tag: &str) -> Value {
        json!({"typeinfo": {"type": tag}})
    }

    #[test]
    fn groups_in_first_seen_order() {
        let entities = vec![
            ("A001".to_string(), entity("Ship")),
            ("B001".to_string(), entity("Weapon")),
            ("A002".to_string(), entity("Ship")),
        ];
        let partitions = partition(&entities).expect("partition");
        assert_eq!(
            partitions,
            vec![
                Partition {
                    tag: "Ship".to_string(),
                    keys: vec!["A001".to_string(), "A002".to_string()],
                },
                Partition {
                    tag: "Weapon".to_string(),
                    keys: vec!["B001".to_string()],
                },
            ]
        );
    }

    #[test]
    fn every_key_lands_in_exactly_one_partition() {
        let entities = vec![
            ("a".to_string(), entity("X")),
            ("b".to_string(), entity("Y")),
            ("c".to_string(), entity("X")),
            ("d".to_string(), entity("Z")),
        ];
        let partitions = partition(&entities).expect("partition");
        let total: usize = partitions.iter().map(|p| p.keys.len()).sum();
        assert_eq!(total, entities.len());

        let mut seen: Vec<&str> = partitions
            .iter()
            .flat_map(|p| p.keys.iter().map(String::as_str))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), entities.len());
    }

    #[test]
    fn missing_typeinfo_is_rejected() {
        let entities = vec![("A001".to_string(), json!({"name": "Destroyer"}))];
        let err = partition(&entities).expect_err("must fail");
        assert!(matches!(err, GparamsError::MissingTypeTag { key } if key == "A001"));
    }

    #[test]
    fn non_string_tag_is_rejected() {
        let entities = vec![("A001".to_string(), json!({"typeinfo": {"type": 7}}))];
        let err = partition(&entities).expect_err("must fail");
        assert!(matches!(err, GparamsError::MissingTypeTag { .. }));
    }

    #[test]
    fn empty_input_yields_no_partitions() {
        let partitions = partition(&[]).expect("partition");
        assert!(partitions.is_empty());
    }
}
