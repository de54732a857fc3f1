//! Catalog service: the engine's operation surface. Orchestrates normalize →
//! count → read → paginate on lists, and validate → derive → persist on
//! writes, against an injected store.

use crate::case;
use crate::catalog::model::{CatalogModel, EntityKind};
use crate::catalog::types::{DeleteMode, EntityConfig};
use crate::error::{EngineError, FieldError};
use crate::policy;
use crate::query::normalize::QueryNormalizer;
use crate::query::pagination::PageMeta;
use crate::response::{assemble, ListPage};
use crate::service::validation::InvariantValidator;
use crate::store::CatalogStore;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Fields the engine owns; stripped from every incoming payload.
const SERVER_MANAGED: [&str; 6] = [
    "id",
    "created_at",
    "updated_at",
    "version",
    policy::ACTIVE_FIELD,
    policy::DELETED_AT_FIELD,
];

pub struct CatalogService<S> {
    model: CatalogModel,
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(model: CatalogModel, store: S) -> Self {
        Self { model, store }
    }

    pub fn model(&self) -> &CatalogModel {
        &self.model
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn entity(&self, kind: EntityKind) -> Result<&EntityConfig, EngineError> {
        self.model
            .entity(kind)
            .ok_or_else(|| EngineError::Internal(format!("no entity config for {kind}")))
    }

    fn not_found(&self, kind: EntityKind, id: &str) -> EngineError {
        EngineError::NotFound(format!("{} {}", kind.noun(), id))
    }

    /// List one entity's records: `{data, pagination}`.
    pub async fn list(
        &self,
        kind: EntityKind,
        params: &HashMap<String, String>,
    ) -> Result<ListPage, EngineError> {
        let config = self.entity(kind)?;
        let descriptor =
            QueryNormalizer::normalize(&self.model.registry, &config.query, params)?;
        tracing::debug!(
            kind = %kind,
            page = descriptor.page,
            limit = descriptor.limit,
            sort = %descriptor.sort_field,
            "list"
        );
        let total = self.store.count(kind, &descriptor).await?;
        let rows = self.store.list(kind, &descriptor).await?;
        Ok(assemble(rows, PageMeta::compute(total, &descriptor)))
    }

    /// Fetch one record by id; soft-deleted records are NotFound unless the
    /// caller opts in.
    pub async fn get(
        &self,
        kind: EntityKind,
        id: &str,
        include_inactive: bool,
    ) -> Result<Value, EngineError> {
        let row = self.fetch_visible(kind, id, include_inactive).await?;
        let mut row = Value::Object(row);
        case::value_keys_to_camel_case(&mut row);
        Ok(row)
    }

    /// Validate and persist a new record. Returns the created row.
    pub async fn create(
        &self,
        kind: EntityKind,
        payload: &HashMap<String, Value>,
    ) -> Result<Value, EngineError> {
        let config = self.entity(kind)?;
        let mut payload = case::hashmap_keys_to_snake_case(payload);
        for field in SERVER_MANAGED {
            payload.remove(field);
        }

        let errors = InvariantValidator::validate_create(&self.model.registry, config, &mut payload);
        if !errors.is_empty() {
            return Err(EngineError::Validation(errors));
        }
        self.check_references(config, &payload).await?;

        let now = Utc::now().to_rfc3339();
        let mut row = Map::new();
        row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        for (k, v) in payload {
            row.insert(k, v);
        }
        row.insert("created_at".into(), Value::String(now.clone()));
        row.insert("updated_at".into(), Value::String(now));
        row.insert("version".into(), Value::Number(1.into()));
        if config.delete == DeleteMode::Soft {
            row.insert(policy::ACTIVE_FIELD.into(), Value::Bool(true));
            row.insert(policy::DELETED_AT_FIELD.into(), Value::Null);
        }

        tracing::debug!(kind = %kind, "create");
        let mut created = self.store.insert(kind, Value::Object(row)).await?;
        case::value_keys_to_camel_case(&mut created);
        Ok(created)
    }

    /// Partial update restricted to the entity's patchable fields, validated
    /// against the stored record and guarded by its version.
    pub async fn patch(
        &self,
        kind: EntityKind,
        id: &str,
        payload: &HashMap<String, Value>,
    ) -> Result<Value, EngineError> {
        let config = self.entity(kind)?;
        let mut payload = case::hashmap_keys_to_snake_case(payload);
        payload.retain(|field, _| config.is_patchable(field));
        if payload.is_empty() {
            return Err(EngineError::invalid("payload", "no patchable fields in payload"));
        }

        let prior = self.fetch_visible(kind, id, false).await?;
        let errors =
            InvariantValidator::validate_patch(&self.model.registry, config, &mut payload, &prior);
        if !errors.is_empty() {
            return Err(EngineError::Validation(errors));
        }
        self.check_references(config, &payload).await?;

        let expected_version = prior.get("version").and_then(Value::as_i64).unwrap_or(0);
        payload.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));

        tracing::debug!(kind = %kind, id = %id, version = expected_version, "patch");
        let mut updated = self
            .store
            .update(kind, id, &payload, expected_version)
            .await?
            .ok_or_else(|| self.not_found(kind, id))?;
        case::value_keys_to_camel_case(&mut updated);
        Ok(updated)
    }

    /// Delete a record: hard-delete entities are removed (check-then-delete,
    /// so a repeat delete is NotFound); soft-delete entities transition to
    /// inactive.
    pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), EngineError> {
        let config = self.entity(kind)?;
        tracing::debug!(kind = %kind, id = %id, "delete");
        match config.delete {
            DeleteMode::Hard => {
                self.fetch_visible(kind, id, true).await?;
                if !self.store.delete(kind, id).await? {
                    return Err(self.not_found(kind, id));
                }
                Ok(())
            }
            DeleteMode::Soft => {
                let prior = self.fetch_visible(kind, id, false).await?;
                let expected_version =
                    prior.get("version").and_then(Value::as_i64).unwrap_or(0);
                let now = Utc::now();
                let mut marker = Map::new();
                policy::mark_deleted(&mut marker, now);
                marker.insert("updated_at".into(), Value::String(now.to_rfc3339()));
                let changes: HashMap<String, Value> = marker.into_iter().collect();
                self.store
                    .update(kind, id, &changes, expected_version)
                    .await?
                    .ok_or_else(|| self.not_found(kind, id))?;
                Ok(())
            }
        }
    }

    async fn fetch_visible(
        &self,
        kind: EntityKind,
        id: &str,
        include_inactive: bool,
    ) -> Result<Map<String, Value>, EngineError> {
        let row = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| self.not_found(kind, id))?;
        let Value::Object(row) = row else {
            return Err(EngineError::Internal(format!(
                "store returned a non-object row for {kind} {id}"
            )));
        };
        if !policy::is_visible(&row, include_inactive) {
            return Err(self.not_found(kind, id));
        }
        Ok(row)
    }

    /// Foreign references must resolve to an existing, visible target row.
    async fn check_references(
        &self,
        config: &EntityConfig,
        payload: &HashMap<String, Value>,
    ) -> Result<(), EngineError> {
        let mut errors = Vec::new();
        for reference in &config.references {
            let Some(value) = payload.get(&reference.field).filter(|v| !v.is_null()) else {
                continue;
            };
            let Some(id) = value.as_str() else {
                errors.push(FieldError::new(
                    &reference.field,
                    format!("{} must be a string", reference.field),
                ));
                continue;
            };
            let resolved = match self.store.get(reference.target, id).await? {
                Some(Value::Object(row)) => policy::is_visible(&row, false),
                _ => false,
            };
            if !resolved {
                errors.push(FieldError::new(
                    &reference.field,
                    format!(
                        "{} does not reference a known {}",
                        reference.field,
                        reference.target.noun()
                    ),
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(errors))
        }
    }
}
