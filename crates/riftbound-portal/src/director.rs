//! Portal lifecycle state machine
//!
//! States: closed (absence), open-active, collapsing (grace period), and
//! collapsed (removed). The director owns every open location, the
//! per-portal sessions, and the collapse bookkeeping, so a location and
//! its session always live and die together.

use crate::error::{PortalError, Result};
use crate::location::{Location, LocationId, PortalState};
use crate::session::{PortalBuff, PortalSession};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use riftbound_core::{Dice, StatBlock};
use riftbound_registry::{Entity, EntityKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grace ticks between the collapse trigger and removal, so a final
/// narrative message can render
pub const COLLAPSE_GRACE_TICKS: u8 = 1;

/// Why a portal began collapsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseReason {
    /// The planned room count was reached
    FullyExplored,
    /// Stability hit zero
    Unstable,
}

impl fmt::Display for CollapseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollapseReason::FullyExplored => write!(f, "fully explored"),
            CollapseReason::Unstable => write!(f, "unstable"),
        }
    }
}

/// Collapse-in-progress bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collapse {
    pub reason: CollapseReason,
    pub grace: u8,
}

/// Result of completing a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOutcome {
    pub stability: u8,
    pub rooms: u32,
    pub collapse: Option<CollapseReason>,
}

/// Result of entering a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterOutcome {
    /// True when a legacy location consumed its last entrance and closed
    pub closed: bool,
}

/// Owner of all open locations and their sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalDirector {
    pub(crate) open: IndexMap<LocationId, Location>,
    pub(crate) sessions: IndexMap<LocationId, PortalSession>,
    pub(crate) collapsing: IndexMap<LocationId, Collapse>,
    next_serial: u64,
}

impl PortalDirector {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- queries ----

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.open.get(id)
    }

    pub fn session(&self, id: &LocationId) -> Option<&PortalSession> {
        self.sessions.get(id)
    }

    pub fn is_open(&self, id: &LocationId) -> bool {
        self.open.contains_key(id)
    }

    pub fn open_locations(&self) -> impl Iterator<Item = &Location> {
        self.open.values()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    // ---- transitions ----

    /// closed → open-active: consume a map item into a live portal
    ///
    /// The room count is the blueprint's nominal count plus a uniform
    /// `{-1, 0, 1}` variance, never below one. Initial stability is 100.
    /// The caller removes the map item from inventory atomically with a
    /// successful return.
    pub fn open_map(&mut self, map: &Entity, dice: &mut Dice) -> Result<Location> {
        let EntityKind::Map { portal } = &map.kind else {
            return Err(PortalError::NotAMap(map.id.clone()));
        };

        let expected = (portal.expected_rooms as i64 + dice.range_i64(-1, 1)).max(1) as u32;
        self.next_serial += 1;
        let id = LocationId::new(format!("portal:{}-{}", self.next_serial, map.id.as_str()));

        let location = Location {
            id: id.clone(),
            name: map.name.clone(),
            rarity: map.rarity,
            stability: 100,
            entrances_remaining: 1,
            max_entrances: 1,
            portal: Some(PortalState {
                expected_rooms: expected,
                current_rooms: 0,
                decay: portal.decay,
                event_diversity: portal.event_diversity.clone(),
                risk_level: portal.risk_level,
                theme: portal.theme.clone(),
                source_map_id: map.id.clone(),
            }),
        };
        log::info!("opened portal {id} ({} rooms expected)", expected);
        self.open.insert(id, location.clone());
        Ok(location)
    }

    /// Enter a location, creating its session on first entry
    ///
    /// Legacy locations (no portal data) burn one entrance per entry and
    /// close immediately when the counter hits zero.
    pub fn enter(&mut self, id: &LocationId, now: DateTime<Utc>) -> Result<EnterOutcome> {
        let location = self
            .open
            .get_mut(id)
            .ok_or_else(|| PortalError::NotFound(id.clone()))?;

        if location.is_portal() {
            self.sessions
                .entry(id.clone())
                .or_insert_with(|| PortalSession::new(now));
            return Ok(EnterOutcome { closed: false });
        }

        location.entrances_remaining = location.entrances_remaining.saturating_sub(1);
        if location.entrances_remaining == 0 {
            log::info!("location {id} used up its entrances");
            self.open.shift_remove(id);
            self.sessions.shift_remove(id);
            return Ok(EnterOutcome { closed: true });
        }
        Ok(EnterOutcome { closed: false })
    }

    /// open-active → open-active (or → collapsing): complete one room
    ///
    /// Stability decays by `max(1, floor(stability * pct / 100))` for a
    /// uniform pct in the decay range; a zero-width zero range decays
    /// nothing (the floor of 1 exists to prevent a stall at low stability,
    /// not to force decay where the blueprint asked for none). Already
    /// collapsing portals are reported unchanged.
    pub fn complete_room(&mut self, id: &LocationId, dice: &mut Dice) -> Result<RoomOutcome> {
        if let Some(collapse) = self.collapsing.get(id) {
            let reason = collapse.reason;
            let location = self
                .open
                .get(id)
                .ok_or_else(|| PortalError::NotFound(id.clone()))?;
            let rooms = location.portal.as_ref().map_or(0, |p| p.current_rooms);
            return Ok(RoomOutcome {
                stability: location.stability,
                rooms,
                collapse: Some(reason),
            });
        }

        let location = self
            .open
            .get_mut(id)
            .ok_or_else(|| PortalError::NotFound(id.clone()))?;
        let Some(portal) = location.portal.as_mut() else {
            return Err(PortalError::NotAPortal(id.clone()));
        };

        portal.current_rooms += 1;
        let rooms = portal.current_rooms;
        let (decay_min, decay_max) = (portal.decay.min as i64, portal.decay.max as i64);

        if let Some(session) = self.sessions.get_mut(id) {
            session.rooms_visited += 1;
        }

        let pct = dice.range_i64(decay_min, decay_max);
        let decay = if pct == 0 {
            0
        } else {
            (location.stability as i64 * pct / 100).max(1)
        };
        location.set_stability(location.stability as i64 - decay);
        let stability = location.stability;

        let collapse = self.evaluate_collapse(id);
        Ok(RoomOutcome {
            stability,
            rooms,
            collapse,
        })
    }

    /// Check the OR-combined collapse conditions for a location
    ///
    /// Idempotent: a portal already collapsing keeps its original reason,
    /// and an absent (collapsed) or legacy location yields `None`.
    pub fn evaluate_collapse(&mut self, id: &LocationId) -> Option<CollapseReason> {
        if let Some(collapse) = self.collapsing.get(id) {
            return Some(collapse.reason);
        }
        let location = self.open.get(id)?;
        let portal = location.portal.as_ref()?;

        let reason = if portal.current_rooms >= portal.expected_rooms {
            CollapseReason::FullyExplored
        } else if location.stability == 0 {
            CollapseReason::Unstable
        } else {
            return None;
        };

        log::info!("portal {id} collapsing: {reason}");
        self.collapsing.insert(
            id.clone(),
            Collapse {
                reason,
                grace: COLLAPSE_GRACE_TICKS,
            },
        );
        Some(reason)
    }

    /// collapsing → collapsed: advance the grace countdown
    ///
    /// Locations whose grace ran out are removed together with their
    /// sessions; the returned ids are gone when this call returns.
    pub fn tick_grace(&mut self) -> Vec<LocationId> {
        let mut collapsed = Vec::new();
        for (id, collapse) in self.collapsing.iter_mut() {
            collapse.grace = collapse.grace.saturating_sub(1);
            if collapse.grace == 0 {
                collapsed.push(id.clone());
            }
        }
        for id in &collapsed {
            self.open.shift_remove(id);
            self.sessions.shift_remove(id);
            self.collapsing.shift_remove(id);
            log::info!("portal {id} collapsed");
        }
        collapsed
    }

    /// Drop sessions whose location is no longer open (load hygiene)
    pub fn prune_sessions(&mut self) -> usize {
        let before = self.sessions.len();
        let open = &self.open;
        self.sessions.retain(|id, _| open.contains_key(id));
        before - self.sessions.len()
    }

    // ---- buffs ----

    /// Apply a portal-scoped consumable to the active portal's session
    ///
    /// Fails without mutating anything when the player is not inside an
    /// open portal (`active` is the free-roam zone or a dead location) or
    /// the consumable is not portal-scoped. On success the buff joins that
    /// session and nothing else.
    pub fn apply_buff(
        &mut self,
        active: Option<&LocationId>,
        consumable: &Entity,
        now: DateTime<Utc>,
    ) -> Result<PortalBuff> {
        let EntityKind::Consumable {
            effect,
            amount,
            portal_scoped,
            ..
        } = &consumable.kind
        else {
            return Err(PortalError::NotPortalScoped(consumable.id.clone()));
        };
        if !portal_scoped {
            return Err(PortalError::NotPortalScoped(consumable.id.clone()));
        }

        let id = active.ok_or(PortalError::NotInPortal)?;
        if !self.open.get(id).is_some_and(Location::is_portal) {
            return Err(PortalError::NotInPortal);
        }
        let session = self.sessions.get_mut(id).ok_or(PortalError::NotInPortal)?;

        let mut stat_changes = StatBlock::default();
        match effect {
            riftbound_core::EffectKind::Health => stat_changes.health = *amount,
            riftbound_core::EffectKind::Attack => stat_changes.attack = *amount,
            riftbound_core::EffectKind::Defense => stat_changes.defense = *amount,
        }

        let buff = PortalBuff {
            id: format!("buff:{}-{}", session.active_buffs.len() + 1, consumable.id),
            name: consumable.name.clone(),
            stat_changes,
            consumable_id: consumable.id.clone(),
            applied_at: now,
            rarity: consumable.rarity,
        };
        session.active_buffs.push(buff.clone());
        log::debug!("buff {} applied in {id}", buff.name);
        Ok(buff)
    }

    // ---- test/composition helpers ----

    /// Insert a prebuilt location (save restore, legacy zones)
    pub fn insert_location(&mut self, location: Location) {
        self.open.insert(location.id.clone(), location);
    }

    /// Mutable access for targeted state surgery (save restore)
    pub fn location_mut(&mut self, id: &LocationId) -> Option<&mut Location> {
        self.open.get_mut(id)
    }
}
