//! Riftbound Portal - the portal lifecycle state machine
//!
//! A portal is a time/attempt-bounded dungeon instance opened from a map
//! item. This crate owns:
//! - the [`PortalDirector`] state machine (room progression, stability
//!   decay, collapse, grace period)
//! - per-portal [`PortalSession`] state and portal-scoped buffs
//! - global timed [`ActiveEffect`]s
//! - [`GameState`] snapshots with load-time hygiene and debounced saves
//! - the content-provider interface with its stale-response guard
//! - the idempotency guard for one-shot transactions
//!
//! The whole crate is single-threaded cooperative: callers drive it from
//! one logical actor, and async collaborators re-validate their targets
//! through [`PendingContent`] before any mutation lands.

mod director;
mod economy;
mod effects;
mod error;
mod guard;
mod location;
mod provider;
mod session;
mod state;

pub use director::{
    Collapse, CollapseReason, EnterOutcome, PortalDirector, RoomOutcome, COLLAPSE_GRACE_TICKS,
};
pub use economy::{purchase, shrine_offering, spring_trap, ShrineOutcome, TrapOutcome};
pub use effects::{effective_stats, sweep_expired, ActiveEffect};
pub use error::{PortalError, Result};
pub use guard::TxnGuard;
pub use location::{Location, LocationId, PortalState};
pub use provider::{
    ContentOutcome, ContentProvider, EventRequest, GameEvent, PendingContent, PortalContext,
    ProviderError, ShopItem, ShrineOffer, TrapRisk, TreasureOffer,
};
pub use session::{PortalBuff, PortalSession};
pub use state::{GameState, Player, SaveDebouncer, GAME_STATE_KEY};
