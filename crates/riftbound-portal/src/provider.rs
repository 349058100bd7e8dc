//! Content provider interface and the stale-response guard
//!
//! Narrative events come from an external provider (an AI service in the
//! reference environment). The core only pins down the request/response
//! shapes and the rule that a response may not touch state whose target
//! disappeared while the request was in flight.
//!
//! There is no retry and no fallback: a failed generation surfaces as an
//! error event, by design, rather than substituting a stale reward.

use crate::director::PortalDirector;
use crate::error::{PortalError, Result};
use crate::location::{Location, LocationId};
use riftbound_core::{Rarity, StatBlock};
use riftbound_registry::{ChoiceDef, GearSlot, RiskLevel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content provider failure
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("content provider failed: {0}")]
    Failed(String),
}

/// Portal context attached to a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalContext {
    pub theme: String,
    pub rarity: Rarity,
    pub risk_level: RiskLevel,
    pub current_room: u32,
    pub expected_rooms: u32,
    pub stability: u8,
}

/// What the core hands the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub player_stats: StatBlock,
    pub player_level: u32,
    #[serde(default)]
    pub portal: Option<PortalContext>,
}

impl EventRequest {
    /// Build a request for free-roam content
    pub fn free_roam(player_stats: StatBlock, player_level: u32) -> Self {
        Self {
            player_stats,
            player_level,
            portal: None,
        }
    }

    /// Build a request carrying a live portal's context
    pub fn for_portal(player_stats: StatBlock, player_level: u32, location: &Location) -> Self {
        let portal = location.portal.as_ref().map(|p| PortalContext {
            theme: p.theme.clone(),
            rarity: location.rarity,
            risk_level: p.risk_level,
            current_room: p.current_rooms,
            expected_rooms: p.expected_rooms,
            stability: location.stability,
        });
        Self {
            player_stats,
            player_level,
            portal,
        }
    }
}

/// One purchasable line in a generated shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub rarity: Rarity,
    pub price: i64,
    pub stock: u32,
}

/// One treasure the player may pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureOffer {
    pub name: String,
    pub rarity: Rarity,
    pub slot: GearSlot,
}

/// A shrine's proposed bargain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShrineOffer {
    pub rarity: Rarity,
    pub cost_kind: riftbound_core::CostKind,
    pub cost: i64,
}

/// A trap's advertised risk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapRisk {
    pub rarity: Rarity,
    pub fail_chance: f64,
    pub damage: i64,
}

/// The game-event shape a provider must return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameEvent {
    pub description: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub entity_rarity: Option<Rarity>,
    #[serde(default)]
    pub choices: Vec<ChoiceDef>,
    #[serde(default)]
    pub treasures: Vec<TreasureOffer>,
    #[serde(default)]
    pub shop: Vec<ShopItem>,
    #[serde(default)]
    pub shrine: Option<ShrineOffer>,
    #[serde(default)]
    pub trap: Option<TrapRisk>,
}

/// External narrative/content generator
pub trait ContentProvider {
    fn generate_event(&mut self, request: &EventRequest) -> std::result::Result<GameEvent, ProviderError>;
}

/// Terminal state of an in-flight content request
#[derive(Debug)]
pub enum ContentOutcome {
    /// Target still live; the event may be applied
    Applied(GameEvent),
    /// Target collapsed or was abandoned mid-flight; result dropped
    Discarded(LocationId),
    /// Provider failed; surfaced to the player, never substituted
    Failed(ProviderError),
}

/// Captured identifiers for a request targeting a portal
///
/// Capture happens synchronously at request time; [`resolve`] re-checks
/// that the portal, and the session if one existed at capture time, still
/// exist before the result is allowed to land. There is no cancellation of
/// in-flight requests; staleness is detected here, after the fact.
///
/// [`resolve`]: PendingContent::resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContent {
    location: LocationId,
    had_session: bool,
}

impl PendingContent {
    /// Record the target portal; fails if it is not open right now
    pub fn capture(director: &PortalDirector, location: &LocationId) -> Result<Self> {
        if !director.is_open(location) {
            return Err(PortalError::NotFound(location.clone()));
        }
        Ok(Self {
            location: location.clone(),
            had_session: director.session(location).is_some(),
        })
    }

    pub fn location(&self) -> &LocationId {
        &self.location
    }

    /// Gate a provider result against the current world state
    pub fn resolve(
        self,
        director: &PortalDirector,
        result: std::result::Result<GameEvent, ProviderError>,
    ) -> ContentOutcome {
        match result {
            Err(err) => ContentOutcome::Failed(err),
            Ok(event) => {
                let session_gone =
                    self.had_session && director.session(&self.location).is_none();
                if director.is_open(&self.location) && !session_gone {
                    ContentOutcome::Applied(event)
                } else {
                    log::debug!("discarding content for dead portal {}", self.location);
                    ContentOutcome::Discarded(self.location)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riftbound_core::Dice;
    use riftbound_registry::{DecayRange, Entity, EntityKind, PortalBlueprint};

    struct CannedProvider {
        fail: bool,
    }

    impl ContentProvider for CannedProvider {
        fn generate_event(&mut self, _request: &EventRequest) -> std::result::Result<GameEvent, ProviderError> {
            if self.fail {
                Err(ProviderError::Failed("model unavailable".into()))
            } else {
                Ok(GameEvent {
                    description: "A hush falls over the chamber.".into(),
                    ..GameEvent::default()
                })
            }
        }
    }

    fn one_room_map() -> Entity {
        Entity::new(
            "Fissure Map",
            Rarity::Epic,
            EntityKind::Map {
                portal: PortalBlueprint {
                    expected_rooms: 1,
                    decay: DecayRange { min: 0, max: 0 },
                    event_diversity: vec![],
                    risk_level: RiskLevel::High,
                    theme: "fissure".into(),
                },
            },
        )
    }

    #[test]
    fn request_carries_portal_context() {
        let mut director = PortalDirector::new();
        let mut dice = Dice::new(2);
        let location = director.open_map(&one_room_map(), &mut dice).unwrap();

        let request = EventRequest::for_portal(StatBlock::new(100, 10, 5), 3, &location);
        let context = request.portal.unwrap();
        assert_eq!(context.theme, "fissure");
        assert_eq!(context.stability, 100);
        assert_eq!(context.rarity, Rarity::Epic);

        assert!(EventRequest::free_roam(StatBlock::default(), 1).portal.is_none());
    }

    #[test]
    fn live_target_applies() {
        let mut director = PortalDirector::new();
        let mut dice = Dice::new(3);
        let id = director.open_map(&one_room_map(), &mut dice).unwrap().id;

        let pending = PendingContent::capture(&director, &id).unwrap();
        let mut provider = CannedProvider { fail: false };
        let result = provider.generate_event(&EventRequest::free_roam(StatBlock::default(), 1));
        match pending.resolve(&director, result) {
            ContentOutcome::Applied(event) => assert!(!event.description.is_empty()),
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[test]
    fn stale_target_is_discarded() {
        let mut director = PortalDirector::new();
        let mut dice = Dice::new(4);
        let id = director.open_map(&one_room_map(), &mut dice).unwrap().id;
        let pending = PendingContent::capture(&director, &id).unwrap();

        // The portal collapses while the request is in flight
        while director.complete_room(&id, &mut dice).unwrap().collapse.is_none() {}
        director.tick_grace();

        let mut provider = CannedProvider { fail: false };
        let result = provider.generate_event(&EventRequest::free_roam(StatBlock::default(), 1));
        match pending.resolve(&director, result) {
            ContentOutcome::Discarded(dead) => assert_eq!(dead, id),
            other => panic!("expected Discarded, got {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_the_captured_session() {
        let mut director = PortalDirector::new();
        let mut dice = Dice::new(6);
        let id = director.open_map(&one_room_map(), &mut dice).unwrap().id;
        director.enter(&id, chrono::Utc::now()).unwrap();
        let pending = PendingContent::capture(&director, &id).unwrap();

        // The session is gone (abandoned run restored without it) even
        // though the location itself is still open
        director.sessions.shift_remove(&id);

        let mut provider = CannedProvider { fail: false };
        let result = provider.generate_event(&EventRequest::free_roam(StatBlock::default(), 1));
        match pending.resolve(&director, result) {
            ContentOutcome::Discarded(dead) => assert_eq!(dead, id),
            other => panic!("expected Discarded, got {other:?}"),
        }

        // A capture taken before any session existed does not demand one
        let sessionless = PendingContent::capture(&director, &id).unwrap();
        let mut provider = CannedProvider { fail: false };
        let result = provider.generate_event(&EventRequest::free_roam(StatBlock::default(), 1));
        assert!(matches!(
            sessionless.resolve(&director, result),
            ContentOutcome::Applied(_)
        ));
    }

    #[test]
    fn provider_failure_is_fail_closed() {
        let mut director = PortalDirector::new();
        let mut dice = Dice::new(5);
        let id = director.open_map(&one_room_map(), &mut dice).unwrap().id;
        let pending = PendingContent::capture(&director, &id).unwrap();

        let mut provider = CannedProvider { fail: true };
        let result = provider.generate_event(&EventRequest::free_roam(StatBlock::default(), 1));
        match pending.resolve(&director, result) {
            ContentOutcome::Failed(ProviderError::Failed(message)) => {
                assert!(message.contains("unavailable"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn capture_refuses_unknown_target() {
        let director = PortalDirector::new();
        let err = PendingContent::capture(&director, &"portal:ghost".into()).unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
    }
}
