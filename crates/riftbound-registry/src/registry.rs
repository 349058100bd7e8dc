//! The dual-layer entity registry

use crate::config::{OverrideMode, RegistryConfig};
use crate::entity::{Entity, EntityPatch, EntityType, Source};
use crate::error::{RegistryError, Result};
use crate::persist::{DynamicSnapshot, KvStore, DYNAMIC_ENTITIES_KEY};
use crate::validation;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use riftbound_core::{Dice, EntityId, Rarity};
use std::fmt;

/// Options for `EntityRegistry::add`
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// Bypass collision checking entirely (direct override installs)
    pub force: bool,
}

/// Options for `EntityRegistry::add_ai`
#[derive(Debug, Clone, Copy, Default)]
pub struct AiOptions {
    /// Time-to-live in milliseconds, converted to `expires_at`
    pub ttl_ms: Option<i64>,
    /// Drop the entity from persisted snapshots
    pub session_only: bool,
}

/// Aggregate registry counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub canonical: usize,
    pub dynamic: usize,
    pub overrides: usize,
    pub by_type: IndexMap<EntityType, usize>,
    pub by_source: IndexMap<Source, usize>,
}

/// Single source of truth for entity identity across two layers
///
/// Reads resolve override-then-dynamic-then-canonical, so an override
/// always shadows its canonical counterpart of the same id. Iteration
/// order is deterministic for a given registry state (canonical insertion
/// order, then dynamic insertion order).
pub struct EntityRegistry {
    canonical: IndexMap<EntityId, Entity>,
    dynamic: IndexMap<EntityId, Entity>,
    overrides: IndexMap<EntityId, Entity>,
    config: RegistryConfig,
    store: Option<Box<dyn KvStore>>,
}

impl EntityRegistry {
    /// Load the immutable canonical layer once
    ///
    /// Duplicate canonical ids are a construction error; the catalog must
    /// be unambiguous before anything else runs.
    pub fn new(canonical_entities: Vec<Entity>) -> Result<Self> {
        let mut canonical = IndexMap::with_capacity(canonical_entities.len());
        for mut entity in canonical_entities {
            entity.source = Source::Canonical;
            if canonical.contains_key(&entity.id) {
                return Err(RegistryError::DuplicateCanonical(entity.id));
            }
            canonical.insert(entity.id.clone(), entity);
        }
        Ok(Self {
            canonical,
            dynamic: IndexMap::new(),
            overrides: IndexMap::new(),
            config: RegistryConfig::default(),
            store: None,
        })
    }

    /// Attach the injected persistence store
    pub fn attach_store(&mut self, store: Box<dyn KvStore>) {
        self.store = Some(store);
    }

    /// Replace the registry configuration
    pub fn configure(&mut self, config: RegistryConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ---- queries ----

    /// Resolve an id: overrides shadow dynamic, dynamic shadows canonical
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.overrides
            .get(id)
            .or_else(|| self.dynamic.get(id))
            .or_else(|| self.canonical.get(id))
    }

    /// Full override-resolved union of both layers
    pub fn all(&self) -> Vec<&Entity> {
        let mut union = Vec::with_capacity(self.canonical.len() + self.dynamic.len());
        for (id, entity) in &self.canonical {
            union.push(self.overrides.get(id).unwrap_or(entity));
        }
        for (id, entity) in &self.dynamic {
            if self.canonical.contains_key(id) {
                continue;
            }
            union.push(self.overrides.get(id).unwrap_or(entity));
        }
        union
    }

    /// Override-resolved union filtered by entity type
    pub fn by_type(&self, entity_type: EntityType) -> Vec<&Entity> {
        self.all()
            .into_iter()
            .filter(|e| e.entity_type() == entity_type)
            .collect()
    }

    /// Uniform random pick over the filtered set; `None` when it is empty
    pub fn random(
        &self,
        dice: &mut Dice,
        entity_type: EntityType,
        rarity: Option<Rarity>,
    ) -> Option<&Entity> {
        let pool: Vec<&Entity> = self
            .by_type(entity_type)
            .into_iter()
            .filter(|e| rarity.map_or(true, |r| e.rarity == r))
            .collect();
        dice.pick(&pool).copied()
    }

    /// Case-insensitive substring match over names
    pub fn search(&self, name_substring: &str) -> Vec<&Entity> {
        let needle = name_substring.to_lowercase();
        self.all()
            .into_iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact tag membership match
    pub fn by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.all()
            .into_iter()
            .filter(|e| e.tags.contains(tag))
            .collect()
    }

    /// Aggregate counts over the resolved union
    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            canonical: self.canonical.len(),
            dynamic: self.dynamic.len(),
            overrides: self.overrides.len(),
            ..Default::default()
        };
        for entity in self.all() {
            stats.total += 1;
            *stats.by_type.entry(entity.entity_type()).or_default() += 1;
            *stats.by_source.entry(entity.source).or_default() += 1;
        }
        stats
    }

    // ---- mutations ----

    /// Add an entity to the dynamic layer, honoring the override mode
    ///
    /// Returns the stored entity (renamed when variant dedup applied).
    /// Failure leaves the registry untouched.
    pub fn add(&mut self, mut entity: Entity, options: AddOptions) -> Result<Entity> {
        if self.config.validate_on_add {
            if self.config.coerce_validation {
                validation::coerce(&mut entity);
            }
            let issues = validation::validate(&entity);
            if !issues.is_empty() {
                return Err(RegistryError::Validation {
                    name: entity.name,
                    message: issues[0].message.clone(),
                    issues,
                });
            }
        }

        if options.force {
            return self.install_forced(entity);
        }

        let collision = self.all().iter().find(|e| e.name == entity.name).map(|e| e.id.clone());

        match (collision, self.config.override_mode) {
            (Some(existing), OverrideMode::Unique) => Err(RegistryError::NameConflict {
                name: entity.name,
                existing,
            }),
            (Some(existing), OverrideMode::Override) => {
                let prior_version = self.get(&existing).map_or(0, |e| e.version);
                entity.id = existing.clone();
                entity.version = prior_version + 1;
                log::debug!("registering override for {existing}");
                self.overrides.insert(existing, entity.clone());
                self.autosave()?;
                Ok(entity)
            }
            (Some(_), OverrideMode::Variant) => {
                let mut name = entity.name.clone();
                while self.name_taken(&name) {
                    name.push_str(&self.config.auto_variant_suffix);
                }
                entity.id = EntityId::derive(entity.entity_type().as_str(), &name);
                entity.name = name;
                self.insert_dynamic(entity)
            }
            (None, _) => self.insert_dynamic(entity),
        }
    }

    /// Convenience wrapper stamping AI provenance and TTL
    pub fn add_ai(
        &mut self,
        mut entity: Entity,
        now: DateTime<Utc>,
        options: AiOptions,
    ) -> Result<Entity> {
        entity.source = Source::Ai;
        entity.session_only = options.session_only;
        if entity.id.as_str().is_empty() {
            entity.id = EntityId::derive(entity.entity_type().as_str(), &entity.name);
        }
        entity.created_at = Some(now);
        entity.expires_at = options.ttl_ms.map(|ms| now + Duration::milliseconds(ms));
        self.add(entity, AddOptions::default())
    }

    /// Patch an entity
    ///
    /// The patch always lands on the read-visible record: an existing
    /// override (whether it shadows a canonical or a dynamic entity) is
    /// patched in place, canonical targets get a fresh non-destructive
    /// override record, and unshadowed dynamic targets mutate directly.
    /// Either way the version increments.
    pub fn update(&mut self, id: &EntityId, patch: &EntityPatch) -> Result<Entity> {
        if let Some(current) = self.overrides.get(id) {
            let mut merged = current.clone();
            patch.apply(&mut merged);
            merged.version += 1;
            merged.source = Source::Modified;
            log::debug!("updated override record for {id} to v{}", merged.version);
            self.overrides.insert(id.clone(), merged.clone());
            self.autosave()?;
            return Ok(merged);
        }

        if let Some(entity) = self.dynamic.get_mut(id) {
            patch.apply(entity);
            entity.version += 1;
            let updated = entity.clone();
            log::debug!("updated dynamic entity {id} to v{}", updated.version);
            self.autosave()?;
            return Ok(updated);
        }

        if let Some(base) = self.canonical.get(id) {
            let mut merged = base.clone();
            patch.apply(&mut merged);
            merged.version += 1;
            merged.source = Source::Modified;
            log::debug!("recorded override for canonical entity {id}");
            self.overrides.insert(id.clone(), merged.clone());
            self.autosave()?;
            return Ok(merged);
        }

        Err(RegistryError::NotFound(id.clone()))
    }

    /// Delete a dynamic entity or clear a canonical override
    ///
    /// Canonical records are permanent; "removing" one without an override
    /// in place is refused so the catalog can always be recovered.
    pub fn remove(&mut self, id: &EntityId) -> Result<()> {
        if self.dynamic.shift_remove(id).is_some() {
            self.overrides.shift_remove(id);
            log::debug!("removed dynamic entity {id}");
            self.autosave()?;
            return Ok(());
        }
        if self.overrides.shift_remove(id).is_some() {
            log::debug!("cleared override for {id}");
            self.autosave()?;
            return Ok(());
        }
        if self.canonical.contains_key(id) {
            return Err(RegistryError::CanonicalImmutable(id.clone()));
        }
        Err(RegistryError::NotFound(id.clone()))
    }

    /// Delete every AI-sourced dynamic entity; returns how many
    pub fn clear_ai(&mut self) -> Result<usize> {
        let before = self.dynamic.len();
        self.dynamic.retain(|_, e| e.source != Source::Ai);
        let removed = before - self.dynamic.len();
        if removed > 0 {
            log::info!("cleared {removed} AI entities");
            self.autosave()?;
        }
        Ok(removed)
    }

    /// Delete every session-only dynamic entity; returns how many
    pub fn clear_session(&mut self) -> Result<usize> {
        let before = self.dynamic.len();
        self.dynamic.retain(|_, e| !e.session_only);
        let removed = before - self.dynamic.len();
        if removed > 0 {
            log::info!("cleared {removed} session entities");
            self.autosave()?;
        }
        Ok(removed)
    }

    /// Drop all dynamic and override state; canonical is never affected
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.dynamic.len() + self.overrides.len();
        self.dynamic.clear();
        self.overrides.clear();
        if removed > 0 {
            log::info!("cleared dynamic layer ({removed} records)");
            self.autosave()?;
        }
        Ok(removed)
    }

    /// Drop override records only, exposing the canonical definitions again
    pub fn reset_overrides(&mut self) -> Result<usize> {
        let removed = self.overrides.len();
        self.overrides.clear();
        if removed > 0 {
            self.autosave()?;
        }
        Ok(removed)
    }

    /// Remove dynamic entities whose TTL has elapsed; returns how many
    ///
    /// Safe to call repeatedly; an already-pruned registry is a no-op.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> Result<usize> {
        let before = self.dynamic.len();
        self.dynamic.retain(|_, e| !e.is_expired(now));
        let removed = before - self.dynamic.len();
        if removed > 0 {
            log::debug!("pruned {removed} expired entities");
            self.autosave()?;
        }
        Ok(removed)
    }

    // ---- persistence ----

    /// Write the dynamic layer to the attached store
    ///
    /// `session_only` entities are excluded. A registry without a store is
    /// a no-op so headless tests need no storage at all.
    pub fn save_dynamic(&mut self) -> Result<()> {
        if self.store.is_none() {
            return Ok(());
        }
        let snapshot = DynamicSnapshot {
            dynamic: self
                .dynamic
                .values()
                .filter(|e| !e.session_only)
                .cloned()
                .collect(),
            overrides: self.overrides.values().cloned().collect(),
        };
        let payload = snapshot.encode()?;
        if let Some(store) = self.store.as_mut() {
            store.save(DYNAMIC_ENTITIES_KEY, &payload)?;
        }
        Ok(())
    }

    /// Replace the dynamic layer from the attached store
    ///
    /// Returns the number of records loaded; absent key loads nothing.
    pub fn load_dynamic(&mut self) -> Result<usize> {
        let Some(raw) = self.store.as_ref().and_then(|s| s.load(DYNAMIC_ENTITIES_KEY)) else {
            return Ok(0);
        };
        let snapshot = DynamicSnapshot::decode(&raw)?;
        self.dynamic = snapshot
            .dynamic
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        self.overrides = snapshot
            .overrides
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        Ok(self.dynamic.len() + self.overrides.len())
    }

    // ---- internals ----

    fn name_taken(&self, name: &str) -> bool {
        self.all().iter().any(|e| e.name == name)
    }

    fn insert_dynamic(&mut self, entity: Entity) -> Result<Entity> {
        if self.canonical.contains_key(&entity.id) || self.dynamic.contains_key(&entity.id) {
            // Distinct name, colliding slug. Refuse rather than shadow.
            return Err(RegistryError::NameConflict {
                name: entity.name,
                existing: entity.id,
            });
        }
        log::debug!("added dynamic entity {}", entity.id);
        self.dynamic.insert(entity.id.clone(), entity.clone());
        self.autosave()?;
        Ok(entity)
    }

    fn install_forced(&mut self, entity: Entity) -> Result<Entity> {
        if self.canonical.contains_key(&entity.id) {
            self.overrides.insert(entity.id.clone(), entity.clone());
        } else {
            self.dynamic.insert(entity.id.clone(), entity.clone());
        }
        self.autosave()?;
        Ok(entity)
    }

    fn autosave(&mut self) -> Result<()> {
        if self.config.auto_save && self.store.is_some() {
            self.save_dynamic()?;
        }
        Ok(())
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("canonical", &self.canonical.len())
            .field("dynamic", &self.dynamic.len())
            .field("overrides", &self.overrides.len())
            .field("config", &self.config)
            .finish()
    }
}
