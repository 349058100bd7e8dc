//! Identity type for entity definitions
//!
//! Entity ids are stable string keys in `"{type}:{slug}"` form so they stay
//! readable in saves and catalog files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable string identifier for an entity definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an id from an already-formatted string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from an entity type name and a display name
    ///
    /// `derive("enemy", "Cave Goblin")` yields `enemy:cave-goblin`.
    pub fn derive(entity_type: &str, name: &str) -> Self {
        Self(format!("{}:{}", entity_type, slugify(name)))
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `"{type}"` prefix, if the id is well-formed
    pub fn type_prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(prefix, _)| prefix)
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slugifies() {
        let id = EntityId::derive("enemy", "Cave Goblin");
        assert_eq!(id.as_str(), "enemy:cave-goblin");
        assert_eq!(id.type_prefix(), Some("enemy"));
    }

    #[test]
    fn derive_collapses_punctuation() {
        let id = EntityId::derive("consumable", "Elixir of  Vigor (AI)");
        assert_eq!(id.as_str(), "consumable:elixir-of-vigor-ai");
    }
}
