//! Riftbound Registry - dual-layer entity store
//!
//! The registry is the single source of truth for entity identity across
//! two layers:
//! - an immutable **canonical** layer loaded once at construction
//! - a mutable **dynamic** layer for runtime-created (usually AI-sourced)
//!   entities, with optional TTL expiry
//!
//! "Updates" to canonical entities never touch the canonical record; they
//! are stored as **override** records keyed by the same id and layered on
//! read, so the shipped catalog can always be recovered.
//!
//! Construct one [`EntityRegistry`] at composition time and pass it by
//! reference; all mutation goes through its API so the validation and
//! override invariants hold.

pub mod catalog;
mod config;
mod entity;
mod error;
mod persist;
mod registry;
pub mod validation;

pub use config::{OverrideMode, RegistryConfig};
pub use entity::{
    ChoiceDef, DecayRange, Entity, EntityKind, EntityPatch, EntityType, GearSlot, PortalBlueprint,
    RiskLevel, Source,
};
pub use error::{Issue, RegistryError, Result};
pub use persist::{KvStore, MemoryStore, StoreError, DYNAMIC_ENTITIES_KEY};
pub use registry::{AddOptions, AiOptions, EntityRegistry, RegistryStats};
