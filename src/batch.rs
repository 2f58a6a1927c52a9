//! Type-keyed entity batching
//!
//! Groups active entities by classification key so consumer systems can run
//! homogeneous passes (all `"enemy_melee"` entities through the same AI
//! step). Each `batch()` call rebuilds the grouping from scratch: under
//! activation churn a flat O(n) rebuild cannot return stale membership,
//! which incremental maintenance can.

use hashbrown::HashMap;

use crate::entity::{EntityId, EntityView};

/// Fallback key for entities without a type name
pub const UNKNOWN_TYPE: &str = "unknown";

/// Groups entity ids by type name
#[derive(Default)]
pub struct EntityBatcher {
    batches: HashMap<String, Vec<EntityId>>,
}

impl EntityBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the previous grouping and rebuild from the given entities
    ///
    /// Inactive entities are excluded; entities with no type name group
    /// under [`UNKNOWN_TYPE`]. Insertion order within a batch follows input
    /// order.
    pub fn batch<'a, E: EntityView + 'a>(&mut self, entities: impl IntoIterator<Item = &'a E>) {
        self.batches.clear();
        for entity in entities {
            if !entity.is_active() {
                continue;
            }
            let key = entity.type_name().unwrap_or(UNKNOWN_TYPE);
            self.batches
                .entry_ref(key)
                .or_insert_with(Vec::new)
                .push(entity.id());
        }
    }

    /// Entities grouped under a key; empty for keys never populated
    pub fn get_batch(&self, type_name: &str) -> &[EntityId] {
        self.batches
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct type keys in the current grouping
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total entities across all batches
    pub fn batched_entity_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Iterate over the current type keys
    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.batches.keys().map(String::as_str)
    }

    /// Drop all batches
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
