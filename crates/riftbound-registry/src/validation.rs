//! Per-kind entity validation
//!
//! `validate` returns every finding rather than stopping at the first, so
//! callers can surface a complete issue list. `coerce` applies the
//! permissible repairs (trim, clamp, normalize) that `coerce_validation`
//! allows before the strict pass.

use crate::entity::{Entity, EntityKind};
use crate::error::Issue;

/// Check an entity's shape; an empty result means it is acceptable
pub fn validate(entity: &Entity) -> Vec<Issue> {
    let mut issues = Vec::new();

    if entity.name.trim().is_empty() {
        issues.push(Issue::new("name", "name must not be empty"));
    }
    if entity.id.as_str().is_empty() {
        issues.push(Issue::new("id", "id must not be empty"));
    } else {
        let expected = entity.entity_type().as_str();
        match entity.id.type_prefix() {
            Some(prefix) if prefix == expected => {}
            Some(prefix) => issues.push(Issue::new(
                "id",
                format!("id prefix \"{prefix}\" does not match entity type \"{expected}\""),
            )),
            None => issues.push(Issue::new("id", "id must be in \"{type}:{slug}\" form")),
        }
    }
    if let (Some(created), Some(expires)) = (entity.created_at, entity.expires_at) {
        if expires < created {
            issues.push(Issue::new("expires_at", "expires before it was created"));
        }
    }

    match &entity.kind {
        EntityKind::Enemy { stats, .. } => {
            if stats.health <= 0 {
                issues.push(Issue::new("stats.health", "enemy health must be positive"));
            }
            if stats.attack < 0 || stats.defense < 0 {
                issues.push(Issue::new("stats", "enemy stats must not be negative"));
            }
        }
        EntityKind::Treasure { stats, value, .. } => {
            if stats.health < 0 || stats.attack < 0 || stats.defense < 0 {
                issues.push(Issue::new("stats", "treasure stats must not be negative"));
            }
            if *value < 0 {
                issues.push(Issue::new("value", "treasure value must not be negative"));
            }
        }
        EntityKind::Consumable { amount, .. } => {
            if *amount <= 0 {
                issues.push(Issue::new("amount", "consumable amount must be positive"));
            }
        }
        EntityKind::Map { portal } => {
            if portal.expected_rooms == 0 {
                issues.push(Issue::new(
                    "portal.expected_rooms",
                    "a portal needs at least one room",
                ));
            }
            if portal.decay.min > portal.decay.max {
                issues.push(Issue::new(
                    "portal.decay",
                    "decay range min exceeds max",
                ));
            }
            if portal.decay.max > 100 {
                issues.push(Issue::new(
                    "portal.decay",
                    "decay percentage cannot exceed 100",
                ));
            }
        }
        EntityKind::Encounter { choices, .. } => {
            if choices.is_empty() {
                issues.push(Issue::new("choices", "encounter needs at least one choice"));
            }
            for (i, choice) in choices.iter().enumerate() {
                if let Some(risk) = choice.risk {
                    if !(0.0..=1.0).contains(&risk) {
                        issues.push(Issue::new(
                            format!("choices[{i}].risk"),
                            "risk must be a probability in [0, 1]",
                        ));
                    }
                }
            }
        }
    }

    issues
}

/// Apply permissible repairs before strict validation
///
/// Trims the name, lowercases tags, clamps negative numeric payload fields
/// to zero, and swaps an inverted decay range. Anything beyond these still
/// fails the strict check.
pub fn coerce(entity: &mut Entity) {
    entity.name = entity.name.trim().to_string();
    entity.tags = entity
        .tags
        .drain()
        .map(|tag| tag.trim().to_ascii_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    match &mut entity.kind {
        EntityKind::Enemy { stats, .. } | EntityKind::Treasure { stats, .. } => {
            stats.health = stats.health.max(0);
            stats.attack = stats.attack.max(0);
            stats.defense = stats.defense.max(0);
        }
        EntityKind::Consumable { amount, .. } => {
            *amount = (*amount).max(0);
        }
        EntityKind::Map { portal } => {
            if portal.decay.min > portal.decay.max {
                std::mem::swap(&mut portal.decay.min, &mut portal.decay.max);
            }
            portal.decay.max = portal.decay.max.min(100);
            portal.decay.min = portal.decay.min.min(100);
        }
        EntityKind::Encounter { .. } => {}
    }

    if let EntityKind::Treasure { value, .. } = &mut entity.kind {
        *value = (*value).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DecayRange, PortalBlueprint, RiskLevel};
    use riftbound_core::{Rarity, StatBlock};

    fn map_with_decay(min: u8, max: u8) -> Entity {
        Entity::new(
            "Torn Map",
            Rarity::Uncommon,
            EntityKind::Map {
                portal: PortalBlueprint {
                    expected_rooms: 4,
                    decay: DecayRange { min, max },
                    event_diversity: vec![],
                    risk_level: RiskLevel::Low,
                    theme: String::new(),
                },
            },
        )
    }

    #[test]
    fn accepts_well_formed_enemy() {
        let enemy = Entity::new(
            "Goblin",
            Rarity::Common,
            EntityKind::Enemy {
                stats: StatBlock::new(20, 5, 3),
                abilities: vec![],
            },
        );
        assert!(validate(&enemy).is_empty());
    }

    #[test]
    fn flags_empty_name_and_bad_stats() {
        let mut enemy = Entity::new(
            "Goblin",
            Rarity::Common,
            EntityKind::Enemy {
                stats: StatBlock::new(0, -1, 0),
                abilities: vec![],
            },
        );
        enemy.name = "  ".to_string();
        let issues = validate(&enemy);
        assert!(issues.iter().any(|i| i.field == "name"));
        assert!(issues.iter().any(|i| i.field == "stats.health"));
        assert!(issues.iter().any(|i| i.field == "stats"));
    }

    #[test]
    fn flags_mismatched_id_prefix() {
        let mut enemy = Entity::new(
            "Goblin",
            Rarity::Common,
            EntityKind::Enemy {
                stats: StatBlock::new(20, 5, 3),
                abilities: vec![],
            },
        );
        enemy.id = "treasure:goblin".into();
        let issues = validate(&enemy);
        assert!(issues.iter().any(|i| i.field == "id"));
    }

    #[test]
    fn inverted_decay_fails_strict_but_coerces() {
        let mut map = map_with_decay(30, 10);
        assert!(validate(&map).iter().any(|i| i.field == "portal.decay"));
        coerce(&mut map);
        assert!(validate(&map).is_empty());
        if let EntityKind::Map { portal } = &map.kind {
            assert_eq!((portal.decay.min, portal.decay.max), (10, 30));
        }
    }

    #[test]
    fn coerce_normalizes_tags_and_clamps() {
        let mut enemy = Entity::new(
            "Goblin",
            Rarity::Common,
            EntityKind::Enemy {
                stats: StatBlock::new(20, -5, 3),
                abilities: vec![],
            },
        )
        .with_tags(["  Forest ", "NIGHT"]);
        coerce(&mut enemy);
        assert!(enemy.tags.contains("forest"));
        assert!(enemy.tags.contains("night"));
        assert_eq!(enemy.stats().unwrap().attack, 0);
    }
}
