//! Global timed effects and effective stat resolution

use crate::session::PortalSession;
use chrono::{DateTime, Utc};
use riftbound_core::StatBlock;
use serde::{Deserialize, Serialize};

/// A global (non-portal-scoped) temporary stat modifier
///
/// Owned by player state; lives until its absolute `end_time` and is
/// removed by the periodic sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: String,
    pub name: String,
    pub stat_changes: StatBlock,
    pub end_time: DateTime<Utc>,
}

impl ActiveEffect {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }
}

/// Drop expired effects in place; returns how many were removed
pub fn sweep_expired(effects: &mut Vec<ActiveEffect>, now: DateTime<Utc>) -> usize {
    let before = effects.len();
    effects.retain(|effect| !effect.is_expired(now));
    before - effects.len()
}

/// Player-facing stats: base, plus live global effects, plus the active
/// portal session's buffs (and only that session's)
pub fn effective_stats(
    base: StatBlock,
    effects: &[ActiveEffect],
    session: Option<&PortalSession>,
) -> StatBlock {
    let from_effects = effects
        .iter()
        .fold(StatBlock::default(), |acc, e| acc + e.stat_changes);
    let from_buffs = session.map(|s| s.buff_total()).unwrap_or_default();
    base + from_effects + from_buffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn effect(name: &str, attack: i64, ends_in_ms: i64, now: DateTime<Utc>) -> ActiveEffect {
        ActiveEffect {
            id: format!("effect:{name}"),
            name: name.to_string(),
            stat_changes: StatBlock::new(0, attack, 0),
            end_time: now + Duration::milliseconds(ends_in_ms),
        }
    }

    #[test]
    fn sweep_removes_only_expired() {
        let now = Utc::now();
        let mut effects = vec![
            effect("stale", 2, -1, now),
            effect("live", 3, 60_000, now),
        ];
        assert_eq!(sweep_expired(&mut effects, now), 1);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].name, "live");
    }

    #[test]
    fn effective_stats_layers_all_sources() {
        let now = Utc::now();
        let base = StatBlock::new(100, 10, 5);
        let effects = vec![effect("war-chant", 4, 60_000, now)];

        let mut session = PortalSession::new(now);
        session.active_buffs.push(crate::session::PortalBuff {
            id: "buff:1".into(),
            name: "Fury".into(),
            stat_changes: StatBlock::new(0, 6, 0),
            consumable_id: "consumable:fury-tonic".into(),
            applied_at: now,
            rarity: riftbound_core::Rarity::Uncommon,
        });

        let with_session = effective_stats(base, &effects, Some(&session));
        assert_eq!(with_session.attack, 20);

        // Outside the portal the session's buffs do not apply
        let without = effective_stats(base, &effects, None);
        assert_eq!(without.attack, 14);
    }
}
