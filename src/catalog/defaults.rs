//! The stock horticultural model: vocabularies plus one declarative config
//! per catalog entity. The engine itself is vocabulary-agnostic; everything
//! domain-specific lives here.

use crate::catalog::model::{CatalogModel, EntityKind};
use crate::catalog::types::{
    DeleteMode, DerivedField, EntityConfig, EntityRules, FieldRule, FilterKind, QueryConfig,
    RangeRule, ReferenceField,
};
use crate::error::ConfigError;
use crate::registry::EnumRegistry;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub fn horticultural_registry() -> EnumRegistry {
    let mut r = EnumRegistry::new();
    r.register("plant_category", &["crop", "plant"]);
    r.register("growth_cycle", &["annual", "biennial", "perennial"]);
    r.register(
        "growth_habit",
        &["climbing", "creeping", "bushy", "upright", "rosette", "trailing", "spreading"],
    );
    r.register("ideal_season", &["spring", "summer", "autumn", "winter", "year_round"]);
    r.register(
        "plant_purpose",
        &["culinary", "medicinal", "ornamental", "aromatic", "ground_cover", "hedging", "shade"],
    );
    r.register(
        "growth_stage",
        &["germination", "seedling", "vegetative", "budding", "flowering", "fruiting", "harvesting"],
    );
    r.register("soil_type", &["sandy", "clay", "silt", "loam", "peat", "chalk"]);
    r.register("soil_texture", &["coarse", "medium", "fine"]);
    r.register(
        "soil_drainage",
        &["very_poor", "poor", "moderate", "well_drained", "excessive"],
    );
    r.register("soil_nutrient_level", &["low", "moderate", "high"]);
    r.register("soil_organic_matter", &["low", "moderate", "high"]);
    r.register("soil_water_retention", &["low", "moderate", "high"]);
    r.register("soil_ph_type", &["acidic", "neutral", "alkaline"]);
    r.register("seasonality", &["spring", "summer", "autumn", "winter", "year_round"]);
    r.register(
        "pest_type_name",
        &["insect", "mite", "mollusc", "nematode", "rodent", "bird", "weed"],
    );
    r.register(
        "pathogen_type_name",
        &["fungus", "bacteria", "virus", "viroid", "oomycete", "phytoplasma"],
    );
    r.register(
        "spread_method",
        &["airborne", "waterborne", "soilborne", "seedborne", "vector", "contact"],
    );
    r
}

impl CatalogModel {
    /// The full reference-data model: plants, soils, growth stages, pests,
    /// diseases, and the pest/pathogen taxonomies.
    pub fn horticultural() -> Result<Self, ConfigError> {
        CatalogModel::new(
            horticultural_registry(),
            vec![
                plant_config(),
                soil_config(),
                growth_stage_config(),
                pest_config(),
                disease_config(),
                taxonomy_config(EntityKind::PestType, "pest_type_name"),
                taxonomy_config(EntityKind::PathogenType, "pathogen_type_name"),
            ],
        )
    }
}

fn sort_fields(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn filters(entries: &[(&str, FilterKind)]) -> HashMap<String, FilterKind> {
    entries
        .iter()
        .map(|(f, k)| (f.to_string(), k.clone()))
        .collect()
}

fn patchable(rules: &EntityRules, except: &[&str]) -> Vec<String> {
    rules
        .fields
        .iter()
        .map(|(f, _)| f.clone())
        .filter(|f| !except.contains(&f.as_str()))
        .collect()
}

fn plant_config() -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().max_length(20).unique()),
            ("scientific_name".into(), FieldRule::new().max_length(120).unique()),
            ("category".into(), FieldRule::new().required().vocabulary("plant_category")),
            ("growth_cycle".into(), FieldRule::new().required().vocabulary("growth_cycle")),
            ("growth_habit".into(), FieldRule::new().required().vocabulary("growth_habit")),
            ("ideal_season".into(), FieldRule::new().required().vocabulary("ideal_season")),
            ("purpose".into(), FieldRule::new().required().vocabulary("plant_purpose")),
            ("description".into(), FieldRule::new().max_length(500)),
            ("common_names".into(), FieldRule::new().list()),
            ("common_pests".into(), FieldRule::new().list()),
            ("compatible_plants".into(), FieldRule::new().list()),
            ("recommended_fertilizers".into(), FieldRule::new().list()),
            ("region_compatibility".into(), FieldRule::new().list()),
            ("tags".into(), FieldRule::new().list()),
            ("growth_stages".into(), FieldRule::new().list_vocabulary("growth_stage")),
        ],
        range_rules: Vec::new(),
        derived_fields: Vec::new(),
    };
    EntityConfig {
        kind: EntityKind::Plant,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["name", "category", "created_at", "updated_at"]),
            default_sort_field: "name".into(),
            default_limit: 10,
            max_limit: 100,
            filterable_fields: filters(&[
                ("category", FilterKind::Enum("plant_category".into())),
                ("growth_cycle", FilterKind::Enum("growth_cycle".into())),
                ("growth_habit", FilterKind::Enum("growth_habit".into())),
                ("ideal_season", FilterKind::Enum("ideal_season".into())),
                ("purpose", FilterKind::Enum("plant_purpose".into())),
                ("name", FilterKind::Free),
            ]),
        },
        patchable_fields: patchable(&rules, &[]),
        rules,
        delete: DeleteMode::Hard,
        references: Vec::new(),
    }
}

/// phType is derived, never client-supplied: alkaline if ph_max > 7, else
/// acidic if ph_min < 7, else neutral.
fn derive_ph_type(record: &Map<String, Value>) -> Option<Value> {
    let min = record.get("ph_min").and_then(Value::as_f64);
    let max = record.get("ph_max").and_then(Value::as_f64);
    if min.is_none() && max.is_none() {
        return None;
    }
    let label = if max.is_some_and(|m| m > 7.0) {
        "alkaline"
    } else if min.is_some_and(|m| m < 7.0) {
        "acidic"
    } else {
        "neutral"
    };
    Some(Value::String(label.to_string()))
}

fn soil_config() -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().max_length(50).unique()),
            ("type".into(), FieldRule::new().required().vocabulary("soil_type")),
            ("texture".into(), FieldRule::new().required().vocabulary("soil_texture")),
            ("drainage".into(), FieldRule::new().required().vocabulary("soil_drainage")),
            (
                "nutrient_level".into(),
                FieldRule::new().required().vocabulary("soil_nutrient_level"),
            ),
            (
                "organic_matter_level".into(),
                FieldRule::new().required().vocabulary("soil_organic_matter"),
            ),
            (
                "water_retention_level".into(),
                FieldRule::new().required().vocabulary("soil_water_retention"),
            ),
            ("ph_min".into(), FieldRule::new().minimum(0.0).maximum(14.0)),
            ("ph_max".into(), FieldRule::new().minimum(0.0).maximum(14.0)),
            ("ph_type".into(), FieldRule::new().vocabulary("soil_ph_type")),
            ("description".into(), FieldRule::new().max_length(500)),
        ],
        range_rules: vec![RangeRule {
            min_field: "ph_min".into(),
            max_field: "ph_max".into(),
            allow_equal: true,
        }],
        derived_fields: vec![DerivedField {
            field: "ph_type".into(),
            inputs: vec!["ph_min".into(), "ph_max".into()],
            compute: derive_ph_type,
        }],
    };
    EntityConfig {
        kind: EntityKind::Soil,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["name", "type", "created_at", "updated_at"]),
            default_sort_field: "name".into(),
            default_limit: 10,
            max_limit: 50,
            filterable_fields: filters(&[
                ("type", FilterKind::Enum("soil_type".into())),
                ("texture", FilterKind::Enum("soil_texture".into())),
                ("drainage", FilterKind::Enum("soil_drainage".into())),
                ("water_retention_level", FilterKind::Enum("soil_water_retention".into())),
                ("ph_type", FilterKind::Enum("soil_ph_type".into())),
                ("name", FilterKind::Free),
            ]),
        },
        patchable_fields: patchable(&rules, &["ph_type"]),
        rules,
        delete: DeleteMode::Hard,
        references: Vec::new(),
    }
}

fn growth_stage_config() -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().vocabulary("growth_stage").unique()),
            ("order".into(), FieldRule::new().required().integer().minimum(1.0).unique()),
            ("min_days".into(), FieldRule::new().integer().minimum(0.0)),
            ("max_days".into(), FieldRule::new().integer().minimum(1.0)),
            ("description".into(), FieldRule::new().max_length(300)),
        ],
        range_rules: vec![RangeRule {
            min_field: "min_days".into(),
            max_field: "max_days".into(),
            allow_equal: false,
        }],
        derived_fields: Vec::new(),
    };
    EntityConfig {
        kind: EntityKind::GrowthStage,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["order", "name", "created_at"]),
            default_sort_field: "order".into(),
            default_limit: 10,
            max_limit: 50,
            filterable_fields: filters(&[("name", FilterKind::Enum("growth_stage".into()))]),
        },
        patchable_fields: patchable(&rules, &[]),
        rules,
        delete: DeleteMode::Hard,
        references: Vec::new(),
    }
}

fn pest_config() -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().max_length(100).unique()),
            ("seasonality".into(), FieldRule::new().required().vocabulary("seasonality")),
            ("control_methods".into(), FieldRule::new().max_length(500)),
            ("damage_symptoms".into(), FieldRule::new().max_length(500)),
            ("description".into(), FieldRule::new().max_length(1000)),
            ("life_cycle".into(), FieldRule::new().max_length(1000)),
            ("pest_type_id".into(), FieldRule::new().required()),
        ],
        range_rules: Vec::new(),
        derived_fields: Vec::new(),
    };
    EntityConfig {
        kind: EntityKind::Pest,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["name", "created_at", "updated_at"]),
            default_sort_field: "name".into(),
            default_limit: 10,
            max_limit: 50,
            filterable_fields: filters(&[
                ("seasonality", FilterKind::Enum("seasonality".into())),
                ("pest_type_id", FilterKind::Free),
                ("name", FilterKind::Free),
            ]),
        },
        patchable_fields: patchable(&rules, &[]),
        rules,
        delete: DeleteMode::Soft,
        references: vec![ReferenceField {
            field: "pest_type_id".into(),
            target: EntityKind::PestType,
        }],
    }
}

fn disease_config() -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().max_length(100).unique()),
            ("seasonality".into(), FieldRule::new().required().vocabulary("seasonality")),
            ("spread_method".into(), FieldRule::new().required().vocabulary("spread_method")),
            ("control_methods".into(), FieldRule::new().max_length(500)),
            ("damage_symptoms".into(), FieldRule::new().max_length(500)),
            ("description".into(), FieldRule::new().max_length(1000)),
            ("life_cycle".into(), FieldRule::new().max_length(1000)),
            ("pathogen_type_id".into(), FieldRule::new().required()),
        ],
        range_rules: Vec::new(),
        derived_fields: Vec::new(),
    };
    EntityConfig {
        kind: EntityKind::Disease,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["name", "created_at", "updated_at"]),
            default_sort_field: "name".into(),
            default_limit: 10,
            max_limit: 50,
            filterable_fields: filters(&[
                ("seasonality", FilterKind::Enum("seasonality".into())),
                ("spread_method", FilterKind::Enum("spread_method".into())),
                ("pathogen_type_id", FilterKind::Free),
                ("name", FilterKind::Free),
            ]),
        },
        patchable_fields: patchable(&rules, &[]),
        rules,
        delete: DeleteMode::Soft,
        references: vec![ReferenceField {
            field: "pathogen_type_id".into(),
            target: EntityKind::PathogenType,
        }],
    }
}

/// PestType and PathogenType share a shape: a closed taxonomy name plus an
/// optional description, soft-deleted.
fn taxonomy_config(kind: EntityKind, name_vocabulary: &str) -> EntityConfig {
    let rules = EntityRules {
        fields: vec![
            ("name".into(), FieldRule::new().required().vocabulary(name_vocabulary).unique()),
            ("description".into(), FieldRule::new().max_length(500)),
        ],
        range_rules: Vec::new(),
        derived_fields: Vec::new(),
    };
    EntityConfig {
        kind,
        query: QueryConfig {
            allowed_sort_fields: sort_fields(&["name", "created_at"]),
            default_sort_field: "name".into(),
            default_limit: 10,
            max_limit: 50,
            filterable_fields: filters(&[(
                "name",
                FilterKind::Enum(name_vocabulary.to_string()),
            )]),
        },
        patchable_fields: patchable(&rules, &[]),
        rules,
        delete: DeleteMode::Soft,
        references: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stock_model_builds() {
        let model = CatalogModel::horticultural().unwrap();
        for kind in EntityKind::ALL {
            assert!(model.entity(kind).is_some(), "missing config for {kind}");
        }
    }

    #[test]
    fn ph_type_truth_table() {
        let cases = [
            (json!({"ph_min": 5.0, "ph_max": 6.5}), "acidic"),
            (json!({"ph_min": 6.0, "ph_max": 7.5}), "alkaline"),
            (json!({"ph_min": 7.0, "ph_max": 7.0}), "neutral"),
            (json!({"ph_min": 8.0, "ph_max": 9.0}), "alkaline"),
            (json!({"ph_min": 5.0}), "acidic"),
        ];
        for (record, expected) in cases {
            let out = derive_ph_type(record.as_object().unwrap()).unwrap();
            assert_eq!(out, json!(expected), "for {record}");
        }
    }

    #[test]
    fn ph_type_absent_without_bounds() {
        assert!(derive_ph_type(json!({"name": "loam"}).as_object().unwrap()).is_none());
    }

    #[test]
    fn derived_ph_type_is_not_patchable() {
        let model = CatalogModel::horticultural().unwrap();
        let soil = model.entity(EntityKind::Soil).unwrap();
        assert!(!soil.is_patchable("ph_type"));
        assert!(soil.is_patchable("ph_min"));
    }
}
