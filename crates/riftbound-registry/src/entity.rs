//! Entity envelope and the closed sum of entity payloads

use chrono::{DateTime, Utc};
use riftbound_core::{EffectKind, EntityId, Rarity, StatBlock};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where an entity definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Canonical,
    Ai,
    Modified,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Canonical => "canonical",
            Source::Ai => "ai",
            Source::Modified => "modified",
        }
    }
}

/// Discriminant over the entity payload variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Enemy,
    Treasure,
    Consumable,
    Map,
    Encounter,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Enemy => "enemy",
            EntityType::Treasure => "treasure",
            EntityType::Consumable => "consumable",
            EntityType::Map => "map",
            EntityType::Encounter => "encounter",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Equipment slot a treasure occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearSlot {
    Weapon,
    Armor,
    Accessory,
}

/// Portal danger rating carried on map items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Percentage range the portal's stability decays by per room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayRange {
    pub min: u8,
    pub max: u8,
}

impl Default for DecayRange {
    fn default() -> Self {
        Self { min: 5, max: 15 }
    }
}

/// Portal parameters carried by a map item, consumed when the map is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalBlueprint {
    /// Nominal room count before the open-time variance roll
    pub expected_rooms: u32,
    #[serde(default)]
    pub decay: DecayRange,
    /// Event tags the portal draws content from
    #[serde(default)]
    pub event_diversity: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub theme: String,
}

/// One option presented by an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub id: String,
    pub text: String,
    /// Chance the choice backfires, when the encounter is a gamble
    #[serde(default)]
    pub risk: Option<f64>,
}

/// Type-specific payload, a closed sum over the supported entity types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Enemy {
        stats: StatBlock,
        #[serde(default)]
        abilities: Vec<String>,
    },
    Treasure {
        slot: GearSlot,
        stats: StatBlock,
        value: i64,
    },
    Consumable {
        effect: EffectKind,
        amount: i64,
        /// Present for timed global effects, absent for instant ones
        #[serde(default)]
        duration_ms: Option<i64>,
        /// Usable only inside an open portal
        #[serde(default)]
        portal_scoped: bool,
    },
    Map {
        portal: PortalBlueprint,
    },
    Encounter {
        description: String,
        choices: Vec<ChoiceDef>,
    },
}

impl EntityKind {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Enemy { .. } => EntityType::Enemy,
            EntityKind::Treasure { .. } => EntityType::Treasure,
            EntityKind::Consumable { .. } => EntityType::Consumable,
            EntityKind::Map { .. } => EntityType::Map,
            EntityKind::Encounter { .. } => EntityType::Encounter,
        }
    }
}

/// A game object definition
///
/// The envelope fields are shared by every entity type; the payload lives
/// in [`EntityKind`]. Ids are globally unique within a layer; the same id
/// may exist canonically and as an override, in which case the override
/// shadows on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub source: Source,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub session_only: bool,
    #[serde(default)]
    pub tags: HashSet<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub kind: EntityKind,
}

fn default_version() -> u32 {
    1
}

impl Entity {
    /// Create an entity with an id derived from its type and name
    pub fn new(name: impl Into<String>, rarity: Rarity, kind: EntityKind) -> Self {
        let name = name.into();
        Self {
            id: EntityId::derive(kind.entity_type().as_str(), &name),
            name,
            rarity,
            source: Source::Canonical,
            version: 1,
            session_only: false,
            tags: HashSet::new(),
            color: None,
            created_at: None,
            expires_at: None,
            kind,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// True once the entity's TTL has elapsed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Stat payload for kinds that carry one
    pub fn stats(&self) -> Option<StatBlock> {
        match &self.kind {
            EntityKind::Enemy { stats, .. } | EntityKind::Treasure { stats, .. } => Some(*stats),
            _ => None,
        }
    }
}

/// Partial update applied by `EntityRegistry::update`
///
/// Unset fields leave the entity untouched. `stats` applies only to kinds
/// carrying a stat block and is ignored for the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tags: Option<HashSet<String>>,
    #[serde(default)]
    pub session_only: Option<bool>,
    #[serde(default)]
    pub stats: Option<StatBlock>,
    #[serde(default)]
    pub kind: Option<EntityKind>,
}

impl EntityPatch {
    /// Apply this patch to an entity, without touching id/source/version
    pub fn apply(&self, entity: &mut Entity) {
        if let Some(name) = &self.name {
            entity.name = name.clone();
        }
        if let Some(rarity) = self.rarity {
            entity.rarity = rarity;
        }
        if let Some(color) = &self.color {
            entity.color = Some(color.clone());
        }
        if let Some(tags) = &self.tags {
            entity.tags = tags.clone();
        }
        if let Some(session_only) = self.session_only {
            entity.session_only = session_only;
        }
        if let Some(kind) = &self.kind {
            entity.kind = kind.clone();
        }
        if let Some(stats) = self.stats {
            match &mut entity.kind {
                EntityKind::Enemy { stats: s, .. } => *s = stats,
                EntityKind::Treasure { stats: s, .. } => *s = stats,
                _ => {}
            }
        }
    }
}
