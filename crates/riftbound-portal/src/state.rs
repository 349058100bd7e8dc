//! Whole-game state snapshots and debounced persistence
//!
//! `GameState` is the full save payload: player, inventory, equipment,
//! timed effects, the portal director (open locations and sessions),
//! obtained artifacts, and portraits. Loading applies hygiene: expired
//! effects are filtered out and sessions for locations no longer open
//! are pruned.

use crate::director::PortalDirector;
use crate::effects::{self, ActiveEffect};
use crate::error::Result;
use crate::location::{Location, LocationId};
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use riftbound_core::{Dice, EntityId, StatBlock};
use riftbound_registry::{Entity, GearSlot, KvStore, StoreError};
use serde::{Deserialize, Serialize};

/// Storage key for the game-state snapshot, distinct from the entity key
pub const GAME_STATE_KEY: &str = "riftbound.save";

/// The adventurer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Base stats before effects and buffs
    pub stats: StatBlock,
    /// Current health, distinct from the health stat's maximum
    pub health: i64,
    pub gold: i64,
    pub level: u32,
    pub exp: i64,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            name: "Wanderer".to_string(),
            stats: StatBlock::new(100, 10, 5),
            health: 100,
            gold: 50,
            level: 1,
            exp: 0,
        }
    }
}

/// Everything a save file holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub player: Player,
    #[serde(default)]
    pub inventory: Vec<Entity>,
    #[serde(default)]
    pub equipment: IndexMap<GearSlot, Entity>,
    #[serde(default)]
    pub active_effects: Vec<ActiveEffect>,
    #[serde(default)]
    pub director: PortalDirector,
    #[serde(default)]
    pub artifacts: Vec<EntityId>,
    #[serde(default)]
    pub active_portrait: Option<String>,
    #[serde(default)]
    pub portraits: Vec<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist the snapshot under [`GAME_STATE_KEY`]
    pub fn save(&self, store: &mut dyn KvStore) -> Result<()> {
        let payload = ron::to_string(self).map_err(|e| StoreError::Encode(e.to_string()))?;
        store.save(GAME_STATE_KEY, &payload)?;
        Ok(())
    }

    /// Load a snapshot, applying load-time hygiene
    ///
    /// Expired effects are dropped and orphan portal sessions pruned, so
    /// the restored state is immediately consistent. `None` means no save
    /// exists.
    pub fn load(store: &dyn KvStore, now: DateTime<Utc>) -> Result<Option<Self>> {
        let Some(raw) = store.load(GAME_STATE_KEY) else {
            return Ok(None);
        };
        let mut state: GameState =
            ron::from_str(&raw).map_err(|e| StoreError::Decode(e.to_string()))?;
        let swept = effects::sweep_expired(&mut state.active_effects, now);
        let pruned = state.director.prune_sessions();
        if swept + pruned > 0 {
            log::debug!("load hygiene: {swept} expired effects, {pruned} orphan sessions");
        }
        Ok(Some(state))
    }

    /// Consume a map item from inventory into an open portal
    ///
    /// The item is removed only after the portal opened successfully, so
    /// the conversion is atomic: either both happen or neither does.
    pub fn open_map_from_inventory(
        &mut self,
        map_id: &EntityId,
        dice: &mut Dice,
    ) -> Result<Location> {
        let index = self
            .inventory
            .iter()
            .position(|item| &item.id == map_id)
            .ok_or_else(|| crate::error::PortalError::NotAMap(map_id.clone()))?;
        let location = self.director.open_map(&self.inventory[index], dice)?;
        self.inventory.remove(index);
        Ok(location)
    }

    /// Player-facing stats while the given location is active
    pub fn effective_stats(&self, active: Option<&LocationId>) -> StatBlock {
        let session = active.and_then(|id| self.director.session(id));
        effects::effective_stats(self.player.stats, &self.active_effects, session)
    }
}

/// Trailing-edge save debouncer
///
/// Rapid state changes batch into one write after a quiet period; a final
/// [`flush`] on teardown guarantees no committed mutation is lost even if
/// the quiet period never elapsed.
///
/// [`flush`]: SaveDebouncer::flush
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    quiet: Duration,
    dirty_since: Option<DateTime<Utc>>,
}

impl SaveDebouncer {
    pub fn new(quiet_ms: i64) -> Self {
        Self {
            quiet: Duration::milliseconds(quiet_ms),
            dirty_since: None,
        }
    }

    /// Note a state change; restarts the quiet period
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        self.dirty_since = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Save if the quiet period has elapsed; true when a write happened
    pub fn maybe_flush(
        &mut self,
        state: &GameState,
        store: &mut dyn KvStore,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.dirty_since {
            Some(since) if now - since >= self.quiet => {
                state.save(store)?;
                self.dirty_since = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Unconditional final write of any pending dirty state
    pub fn flush(&mut self, state: &GameState, store: &mut dyn KvStore) -> Result<bool> {
        if self.dirty_since.is_none() {
            return Ok(false);
        }
        state.save(store)?;
        self.dirty_since = None;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::director::CollapseReason;
    use crate::session::PortalSession;
    use riftbound_core::Rarity;
    use riftbound_registry::{DecayRange, EntityKind, MemoryStore, PortalBlueprint, RiskLevel};

    fn crypt_map(expected_rooms: u32) -> Entity {
        Entity::new(
            "Crypt Map",
            Rarity::Rare,
            EntityKind::Map {
                portal: PortalBlueprint {
                    expected_rooms,
                    decay: DecayRange { min: 0, max: 0 },
                    event_diversity: vec!["combat".into()],
                    risk_level: RiskLevel::Medium,
                    theme: "crypt".into(),
                },
            },
        )
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn map_open_consumes_inventory_atomically() {
        let mut state = GameState::new();
        let mut dice = Dice::new(14);
        let map = crypt_map(3);
        let map_id = map.id.clone();
        state.inventory.push(map);

        let location = state.open_map_from_inventory(&map_id, &mut dice).unwrap();
        assert!(state.inventory.is_empty());
        assert!(state.director.is_open(&location.id));

        // A second open of the same id finds nothing and changes nothing
        assert!(state.open_map_from_inventory(&map_id, &mut dice).is_err());
        assert_eq!(state.director.open_count(), 1);
    }

    #[test]
    fn load_filters_expired_effects_and_orphan_sessions() {
        let t0 = now();
        let mut state = GameState::new();
        state.active_effects.push(ActiveEffect {
            id: "effect:stale".into(),
            name: "Stale Chant".into(),
            stat_changes: StatBlock::new(0, 5, 0),
            end_time: t0 - Duration::seconds(1),
        });
        state.active_effects.push(ActiveEffect {
            id: "effect:live".into(),
            name: "Iron Hide".into(),
            stat_changes: StatBlock::new(0, 0, 5),
            end_time: t0 + Duration::hours(1),
        });
        // Session pointing at a location that is no longer open
        state
            .director
            .sessions
            .insert("portal:gone".into(), PortalSession::new(t0));

        let mut store = MemoryStore::new();
        state.save(&mut store).unwrap();

        let loaded = GameState::load(&store, t0).unwrap().unwrap();
        assert_eq!(loaded.active_effects.len(), 1);
        assert_eq!(loaded.active_effects[0].name, "Iron Hide");
        assert!(loaded.director.session(&"portal:gone".into()).is_none());
    }

    #[test]
    fn missing_save_loads_as_none() {
        let store = MemoryStore::new();
        assert!(GameState::load(&store, now()).unwrap().is_none());
    }

    #[test]
    fn debouncer_waits_out_the_quiet_period() {
        let mut debouncer = SaveDebouncer::new(1000);
        let state = GameState::new();
        let mut store = MemoryStore::new();
        let t0 = now();

        debouncer.mark_dirty(t0);
        // Still inside the quiet period
        assert!(!debouncer
            .maybe_flush(&state, &mut store, t0 + Duration::milliseconds(500))
            .unwrap());
        // Another change restarts the clock
        debouncer.mark_dirty(t0 + Duration::milliseconds(800));
        assert!(!debouncer
            .maybe_flush(&state, &mut store, t0 + Duration::milliseconds(1500))
            .unwrap());
        assert!(debouncer
            .maybe_flush(&state, &mut store, t0 + Duration::milliseconds(1900))
            .unwrap());
        assert!(!debouncer.is_dirty());
        assert!(store.load(GAME_STATE_KEY).is_some());
    }

    #[test]
    fn teardown_flush_never_loses_dirty_state() {
        let mut debouncer = SaveDebouncer::new(60_000);
        let state = GameState::new();
        let mut store = MemoryStore::new();

        debouncer.mark_dirty(now());
        assert!(debouncer.flush(&state, &mut store).unwrap());
        assert!(store.load(GAME_STATE_KEY).is_some());
        // Nothing dirty, nothing written
        assert!(!debouncer.flush(&state, &mut store).unwrap());
    }

    #[test]
    fn full_portal_run_ends_with_clean_removal() {
        let mut state = GameState::new();
        let mut dice = Dice::new(123);
        let map = crypt_map(3);
        let map_id = map.id.clone();
        state.inventory.push(map);

        let location = state.open_map_from_inventory(&map_id, &mut dice).unwrap();
        let id = location.id.clone();
        let expected = location.portal.as_ref().unwrap().expected_rooms;
        assert!((2..=4).contains(&expected));

        state.director.enter(&id, now()).unwrap();
        let (rooms, reason) = loop {
            let outcome = state.director.complete_room(&id, &mut dice).unwrap();
            if let Some(reason) = outcome.collapse {
                break (outcome.rooms, reason);
            }
        };
        assert_eq!(rooms, expected);
        assert_eq!(reason, CollapseReason::FullyExplored);

        // Within one grace tick the location and its session are both gone
        state.director.tick_grace();
        assert!(!state.director.is_open(&id));
        assert!(state.director.session(&id).is_none());
        assert_eq!(state.director.open_count(), 0);
    }
}
