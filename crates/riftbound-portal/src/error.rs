//! Error types for riftbound-portal
//!
//! Everything here is a recoverable condition surfaced to the player or
//! orchestration layer; none of these abort the session.

use crate::location::LocationId;
use riftbound_core::EntityId;
use riftbound_registry::StoreError;
use thiserror::Error;

/// Portal error type
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("location not found: {0}")]
    NotFound(LocationId),

    #[error("{0} is not a map item")]
    NotAMap(EntityId),

    #[error("{0} carries no portal data")]
    NotAPortal(LocationId),

    #[error("that only works inside a portal")]
    NotInPortal,

    #[error("{0} is not a portal-scoped consumable")]
    NotPortalScoped(EntityId),

    #[error("not enough {resource}: need {needed}, have {available}")]
    Insufficient {
        resource: &'static str,
        needed: i64,
        available: i64,
    },

    #[error("out of stock")]
    OutOfStock,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PortalError>;
