//! Canonical catalog loading
//!
//! The ship-time entity catalog is authored as a RON document with a
//! top-level `entities` list. Loading rejects duplicate ids so the
//! canonical layer is unambiguous from the start.

use crate::entity::Entity;
use crate::error::{RegistryError, Result};
use riftbound_core::EntityId;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Deserialize)]
struct CatalogFile {
    entities: Vec<Entity>,
}

/// Parse a canonical catalog from a RON string
pub fn from_ron(content: &str) -> Result<Vec<Entity>> {
    let file: CatalogFile =
        ron::from_str(content).map_err(|e| RegistryError::Catalog(e.to_string()))?;

    let mut seen: HashSet<EntityId> = HashSet::new();
    for entity in &file.entities {
        if !seen.insert(entity.id.clone()) {
            return Err(RegistryError::DuplicateCanonical(entity.id.clone()));
        }
    }
    Ok(file.entities)
}
