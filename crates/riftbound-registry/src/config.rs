//! Registry configuration

use serde::{Deserialize, Serialize};

/// Policy for resolving name collisions on add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    /// Rename the newcomer by appending the variant suffix until unique
    #[default]
    Variant,
    /// Register the newcomer as an override at the existing entity's id
    Override,
    /// Refuse the add with a conflict error
    Unique,
}

/// Process-wide registry configuration
///
/// Initialized once at construction, mutable via
/// `EntityRegistry::configure`, read by every add operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub override_mode: OverrideMode,
    /// Persist the dynamic layer after each successful mutation
    pub auto_save: bool,
    /// Suffix appended when deduplicating variant names
    pub auto_variant_suffix: String,
    pub validate_on_add: bool,
    /// Apply permissible coercions before the strict validation pass
    pub coerce_validation: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            override_mode: OverrideMode::Variant,
            auto_save: true,
            auto_variant_suffix: " (AI)".to_string(),
            validate_on_add: true,
            coerce_validation: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = RegistryConfig::default();
        assert_eq!(config.override_mode, OverrideMode::Variant);
        assert_eq!(config.auto_variant_suffix, " (AI)");
        assert!(config.validate_on_add);
        assert!(!config.coerce_validation);
    }
}
