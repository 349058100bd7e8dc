//! Per-portal runtime sessions and their scoped buffs

use chrono::{DateTime, Utc};
use riftbound_core::{EntityId, Rarity, StatBlock};
use serde::{Deserialize, Serialize};

/// A temporary stat modifier scoped to one portal session
///
/// Owned exclusively by its session; when the portal collapses the buff
/// goes with it. It never applies to another portal or to free roam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalBuff {
    pub id: String,
    pub name: String,
    pub stat_changes: StatBlock,
    /// The consumable that granted this buff
    pub consumable_id: EntityId,
    pub applied_at: DateTime<Utc>,
    pub rarity: Rarity,
}

/// Ephemeral runtime state for one open portal
///
/// Created on first entry, destroyed together with the portal. Sessions
/// for locations no longer open are pruned on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSession {
    pub entered_at: DateTime<Utc>,
    pub rooms_visited: u32,
    pub active_buffs: Vec<PortalBuff>,
}

impl PortalSession {
    pub fn new(entered_at: DateTime<Utc>) -> Self {
        Self {
            entered_at,
            rooms_visited: 0,
            active_buffs: Vec::new(),
        }
    }

    /// Sum of every active buff's stat changes
    pub fn buff_total(&self) -> StatBlock {
        self.active_buffs
            .iter()
            .fold(StatBlock::default(), |acc, buff| acc + buff.stat_changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buff_total_sums() {
        let mut session = PortalSession::new(Utc::now());
        assert!(session.buff_total().is_empty());
        session.active_buffs.push(PortalBuff {
            id: "buff-1".into(),
            name: "Stoneskin".into(),
            stat_changes: StatBlock::new(0, 0, 8),
            consumable_id: "consumable:stoneskin-draught".into(),
            applied_at: Utc::now(),
            rarity: Rarity::Uncommon,
        });
        session.active_buffs.push(PortalBuff {
            id: "buff-2".into(),
            name: "Battle Fury".into(),
            stat_changes: StatBlock::new(0, 6, 0),
            consumable_id: "consumable:fury-tonic".into(),
            applied_at: Utc::now(),
            rarity: Rarity::Rare,
        });
        assert_eq!(session.buff_total(), StatBlock::new(0, 6, 8));
    }
}
