//! Error types for riftbound-registry
//!
//! Registry failures are values, not panics: validation problems and
//! policy conflicts come back as structured errors the caller can show or
//! recover from, and a failed operation never leaves partial state.

use crate::persist::StoreError;
use riftbound_core::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field-level validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub field: String,
    pub message: String,
}

impl Issue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Registry error type
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("validation failed for \"{name}\": {message}")]
    Validation {
        name: String,
        message: String,
        issues: Vec<Issue>,
    },

    #[error("name conflict: \"{name}\" is already used by {existing}")]
    NameConflict { name: String, existing: EntityId },

    #[error("entity not found: {0}")]
    NotFound(EntityId),

    #[error("duplicate canonical id: {0}")]
    DuplicateCanonical(EntityId),

    #[error("canonical entity {0} cannot be deleted, only overridden")]
    CanonicalImmutable(EntityId),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RegistryError>;
