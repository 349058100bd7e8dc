//! Open dungeon locations

use riftbound_core::{EntityId, Rarity};
use riftbound_registry::{DecayRange, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for an open location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LocationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Runtime portal parameters, fixed at open time except for the counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalState {
    /// Room count rolled when the map was opened
    pub expected_rooms: u32,
    /// Rooms completed so far; only ever increases, and exceeding
    /// `expected_rooms` (bonus rooms) is a valid state
    pub current_rooms: u32,
    pub decay: DecayRange,
    pub event_diversity: Vec<String>,
    pub risk_level: RiskLevel,
    pub theme: String,
    /// The map item this portal was opened from
    pub source_map_id: EntityId,
}

/// An open dungeon instance
///
/// Portal locations track stability in `0..=100`; legacy locations have no
/// portal data and run on the entrances counter instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub rarity: Rarity,
    pub stability: u8,
    pub entrances_remaining: u32,
    pub max_entrances: u32,
    #[serde(default)]
    pub portal: Option<PortalState>,
}

impl Location {
    /// True when this location uses the stability/room mechanic
    pub fn is_portal(&self) -> bool {
        self.portal.is_some()
    }

    /// Clamp-assign stability into `0..=100`
    pub fn set_stability(&mut self, value: i64) {
        self.stability = value.clamp(0, 100) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stability_clamps_both_ends() {
        let mut location = Location {
            id: "portal:test".into(),
            name: "Test".into(),
            rarity: Rarity::Common,
            stability: 50,
            entrances_remaining: 1,
            max_entrances: 1,
            portal: None,
        };
        location.set_stability(-20);
        assert_eq!(location.stability, 0);
        location.set_stability(500);
        assert_eq!(location.stability, 100);
    }
}
