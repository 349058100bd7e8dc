//! Error types for riftbound-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    #[error("unknown rarity tier: {0}")]
    UnknownRarity(String),

    #[error("unknown cost kind: {0}")]
    UnknownCostKind(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
