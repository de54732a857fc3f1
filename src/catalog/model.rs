//! Resolved catalog model: validated per-entity configs plus the vocabulary
//! registry, ready for runtime lookup by entity kind.

use crate::catalog::types::EntityConfig;
use crate::catalog::validator::validate;
use crate::error::ConfigError;
use crate::registry::EnumRegistry;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Plant,
    Soil,
    GrowthStage,
    Pest,
    Disease,
    PestType,
    PathogenType,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Plant,
        EntityKind::Soil,
        EntityKind::GrowthStage,
        EntityKind::Pest,
        EntityKind::Disease,
        EntityKind::PestType,
        EntityKind::PathogenType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Plant => "plant",
            EntityKind::Soil => "soil",
            EntityKind::GrowthStage => "growth_stage",
            EntityKind::Pest => "pest",
            EntityKind::Disease => "disease",
            EntityKind::PestType => "pest_type",
            EntityKind::PathogenType => "pathogen_type",
        }
    }

    /// Human-readable noun for error messages, e.g. "pest type".
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Plant => "plant",
            EntityKind::Soil => "soil",
            EntityKind::GrowthStage => "growth stage",
            EntityKind::Pest => "pest",
            EntityKind::Disease => "disease",
            EntityKind::PestType => "pest type",
            EntityKind::PathogenType => "pathogen type",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct CatalogModel {
    pub registry: EnumRegistry,
    entities: HashMap<EntityKind, EntityConfig>,
}

impl CatalogModel {
    /// Build a model from a registry and entity configs; fails when a config
    /// references vocabularies or fields that do not exist.
    pub fn new(registry: EnumRegistry, configs: Vec<EntityConfig>) -> Result<Self, ConfigError> {
        validate(&registry, &configs)?;
        let mut entities = HashMap::with_capacity(configs.len());
        for config in configs {
            entities.insert(config.kind, config);
        }
        Ok(Self { registry, entities })
    }

    pub fn entity(&self, kind: EntityKind) -> Option<&EntityConfig> {
        self.entities.get(&kind)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entities.values()
    }
}
