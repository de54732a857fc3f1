//! Config validation: referential integrity of entity configs against the
//! registry, run once at model construction.

use crate::catalog::types::{EntityConfig, FilterKind};
use crate::error::ConfigError;
use crate::registry::EnumRegistry;
use std::collections::HashSet;

pub fn validate(registry: &EnumRegistry, configs: &[EntityConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for config in configs {
        let entity = config.kind.as_str();
        if !seen.insert(config.kind) {
            return Err(ConfigError::DuplicateEntity(entity));
        }

        for (field, rule) in &config.rules.fields {
            for kind in [&rule.vocabulary, &rule.list_vocabulary].into_iter().flatten() {
                if !registry.contains_kind(kind) {
                    return Err(ConfigError::MissingVocabulary {
                        entity,
                        field: field.clone(),
                        kind: kind.clone(),
                    });
                }
            }
        }

        for (field, kind) in &config.query.filterable_fields {
            if let FilterKind::Enum(kind) = kind {
                if !registry.contains_kind(kind) {
                    return Err(ConfigError::MissingVocabulary {
                        entity,
                        field: field.clone(),
                        kind: kind.clone(),
                    });
                }
            }
        }

        if !config
            .query
            .allowed_sort_fields
            .iter()
            .any(|f| *f == config.query.default_sort_field)
        {
            return Err(ConfigError::DefaultSortNotAllowed {
                entity,
                field: config.query.default_sort_field.clone(),
            });
        }

        for range in &config.rules.range_rules {
            for field in [&range.min_field, &range.max_field] {
                if !config.rules.declares(field) {
                    return Err(ConfigError::UnknownRuleField {
                        entity,
                        field: field.clone(),
                    });
                }
            }
        }

        for derived in &config.rules.derived_fields {
            if config.is_patchable(&derived.field) {
                return Err(ConfigError::DerivedFieldPatchable {
                    entity,
                    field: derived.field.clone(),
                });
            }
            for input in &derived.inputs {
                if !config.rules.declares(input) {
                    return Err(ConfigError::UnknownRuleField {
                        entity,
                        field: input.clone(),
                    });
                }
            }
        }

        for field in &config.patchable_fields {
            if !config.rules.declares(field) {
                return Err(ConfigError::UnknownRuleField {
                    entity,
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::EntityKind;
    use crate::catalog::types::{DeleteMode, EntityRules, FieldRule, QueryConfig};
    use std::collections::HashMap;

    fn minimal_config() -> EntityConfig {
        EntityConfig {
            kind: EntityKind::Plant,
            query: QueryConfig {
                allowed_sort_fields: vec!["name".into()],
                default_sort_field: "name".into(),
                default_limit: 10,
                max_limit: 100,
                filterable_fields: HashMap::new(),
            },
            rules: EntityRules {
                fields: vec![("name".into(), FieldRule::new().required())],
                range_rules: Vec::new(),
                derived_fields: Vec::new(),
            },
            patchable_fields: vec!["name".into()],
            delete: DeleteMode::Hard,
            references: Vec::new(),
        }
    }

    #[test]
    fn accepts_minimal_config() {
        assert!(validate(&EnumRegistry::new(), &[minimal_config()]).is_ok());
    }

    #[test]
    fn rejects_unknown_vocabulary() {
        let mut config = minimal_config();
        config
            .rules
            .fields
            .push(("category".into(), FieldRule::new().vocabulary("nope")));
        let err = validate(&EnumRegistry::new(), &[config]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVocabulary { .. }));
    }

    #[test]
    fn rejects_default_sort_outside_allowed() {
        let mut config = minimal_config();
        config.query.default_sort_field = "created_at".into();
        let err = validate(&EnumRegistry::new(), &[config]).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultSortNotAllowed { .. }));
    }

    #[test]
    fn rejects_undeclared_patchable_field() {
        let mut config = minimal_config();
        config.patchable_fields.push("ghost".into());
        let err = validate(&EnumRegistry::new(), &[config]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRuleField { .. }));
    }
}
