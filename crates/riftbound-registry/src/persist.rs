//! Persistence contract
//!
//! The registry never talks to real storage directly; it goes through the
//! injected [`KvStore`] interface so tests run against [`MemoryStore`] and
//! the host environment can plug in whatever backing it has. Snapshots are
//! RON-encoded strings.

use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Storage key for the dynamic entity snapshot
pub const DYNAMIC_ENTITIES_KEY: &str = "riftbound.entities";

/// Persistence error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot encoding failed: {0}")]
    Encode(String),

    #[error("snapshot decoding failed: {0}")]
    Decode(String),

    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Injected key-value persistence interface
pub trait KvStore {
    /// Load the value stored under a key, if any
    fn load(&self, key: &str) -> Option<String>;

    /// Store a value under a key
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, the test double and reference backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serialized form of the registry's mutable state
///
/// `session_only` entities are filtered out before this is built, so they
/// never reach storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynamicSnapshot {
    pub dynamic: Vec<Entity>,
    pub overrides: Vec<Entity>,
}

impl DynamicSnapshot {
    pub fn encode(&self) -> Result<String, StoreError> {
        ron::to_string(self).map_err(|e| StoreError::Encode(e.to_string()))
    }

    pub fn decode(raw: &str) -> Result<Self, StoreError> {
        ron::from_str(raw).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use chrono::{TimeZone, Utc};
    use riftbound_core::{Rarity, StatBlock};

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.load("missing").is_none());
        store.save("key", "value").unwrap();
        assert_eq!(store.load("key").as_deref(), Some("value"));
        assert_eq!(store.len(), 1);
        // Overwriting a key does not grow the store
        store.save("key", "value2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("key").as_deref(), Some("value2"));
    }

    #[test]
    fn snapshot_preserves_timestamps_exactly() {
        let mut entity = Entity::new(
            "Ember Sprite",
            Rarity::Rare,
            EntityKind::Enemy {
                stats: StatBlock::new(60, 14, 10),
                abilities: vec!["ignite".into()],
            },
        );
        entity.created_at = Some(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());
        entity.expires_at = Some(Utc.timestamp_millis_opt(1_700_000_060_123).unwrap());

        let snapshot = DynamicSnapshot {
            dynamic: vec![entity.clone()],
            overrides: vec![],
        };
        let decoded = DynamicSnapshot::decode(&snapshot.encode().unwrap()).unwrap();
        assert_eq!(decoded.dynamic[0].created_at, entity.created_at);
        assert_eq!(decoded.dynamic[0].expires_at, entity.expires_at);
        assert_eq!(decoded.dynamic[0], entity);
    }
}
