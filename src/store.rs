//! Repository seam: the engine reaches persistence only through
//! `CatalogStore`. `MemoryStore` is the in-process implementation used by the
//! test suite and the reference semantics for adapters (exact-match filters,
//! ordered range reads, uniqueness, version-guarded updates, soft-delete
//! visibility).

use crate::catalog::model::{CatalogModel, EntityKind};
use crate::policy;
use crate::query::normalize::{QueryDescriptor, SortOrder};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::EngineError;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Count rows matching the descriptor's filters and visibility.
    async fn count(&self, kind: EntityKind, descriptor: &QueryDescriptor) -> Result<u64, EngineError>;

    /// Ordered range read honoring filters, sort, offset, and limit.
    async fn list(&self, kind: EntityKind, descriptor: &QueryDescriptor)
        -> Result<Vec<Value>, EngineError>;

    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, EngineError>;

    /// Insert a complete row; fails with Conflict on a uniqueness violation.
    async fn insert(&self, kind: EntityKind, row: Value) -> Result<Value, EngineError>;

    /// Apply changes to a row when its version still matches; Conflict when
    /// the row moved underneath the caller, None when it does not exist.
    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        changes: &HashMap<String, Value>,
        expected_version: i64,
    ) -> Result<Option<Value>, EngineError>;

    /// Physically remove a row; true when a row was removed.
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<bool, EngineError>;
}

pub struct MemoryStore {
    unique: HashMap<EntityKind, Vec<String>>,
    rows: RwLock<HashMap<EntityKind, Vec<Map<String, Value>>>>,
}

impl MemoryStore {
    /// Build a store enforcing the model's unique fields.
    pub fn for_model(model: &CatalogModel) -> Self {
        let unique = model
            .entities()
            .map(|e| {
                (
                    e.kind,
                    e.unique_fields().into_iter().map(String::from).collect(),
                )
            })
            .collect();
        Self {
            unique,
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn unique_fields(&self, kind: EntityKind) -> &[String] {
        self.unique.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn check_unique(
        &self,
        kind: EntityKind,
        rows: &[Map<String, Value>],
        candidate: &Map<String, Value>,
        skip_id: Option<&str>,
    ) -> Result<(), EngineError> {
        for field in self.unique_fields(kind) {
            let Some(value) = candidate.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = rows.iter().any(|row| {
                if skip_id.is_some() && row.get("id").and_then(Value::as_str) == skip_id {
                    return false;
                }
                row.get(field).is_some_and(|existing| value_eq(existing, value))
            });
            if taken {
                return Err(EngineError::Conflict(format!(
                    "{} with this {} already exists",
                    kind.noun(),
                    field
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn count(&self, kind: EntityKind, descriptor: &QueryDescriptor) -> Result<u64, EngineError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let n = rows
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| selected(r, descriptor)).count())
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn list(
        &self,
        kind: EntityKind,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<Value>, EngineError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut matched: Vec<&Map<String, Value>> = rows
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| selected(r, descriptor)).collect())
            .unwrap_or_default();
        matched.sort_by(|a, b| {
            let ord = compare_field(a, b, &descriptor.sort_field);
            match descriptor.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(matched
            .into_iter()
            .skip(descriptor.offset as usize)
            .take(descriptor.limit as usize)
            .map(|r| Value::Object(r.clone()))
            .collect())
    }

    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, EngineError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&kind).and_then(|rows| {
            rows.iter()
                .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
                .map(|r| Value::Object(r.clone()))
        }))
    }

    async fn insert(&self, kind: EntityKind, row: Value) -> Result<Value, EngineError> {
        let Value::Object(row) = row else {
            return Err(EngineError::Internal("row must be a JSON object".into()));
        };
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let bucket = rows.entry(kind).or_default();
        self.check_unique(kind, bucket, &row, None)?;
        bucket.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        changes: &HashMap<String, Value>,
        expected_version: i64,
    ) -> Result<Option<Value>, EngineError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let bucket = rows.entry(kind).or_default();
        let Some(index) = bucket
            .iter()
            .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
        else {
            return Ok(None);
        };

        let mut updated = bucket[index].clone();
        let current = updated.get("version").and_then(Value::as_i64).unwrap_or(0);
        if current != expected_version {
            return Err(EngineError::Conflict(format!(
                "version conflict for {} {}",
                kind.noun(),
                id
            )));
        }
        for (k, v) in changes {
            updated.insert(k.clone(), v.clone());
        }
        updated.insert("version".into(), Value::Number((current + 1).into()));

        self.check_unique(kind, bucket, &updated, Some(id))?;
        bucket[index] = updated.clone();
        Ok(Some(Value::Object(updated)))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<bool, EngineError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let bucket = rows.entry(kind).or_default();
        let before = bucket.len();
        bucket.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        Ok(bucket.len() < before)
    }
}

fn poisoned() -> EngineError {
    EngineError::Internal("store lock poisoned".into())
}

fn selected(row: &Map<String, Value>, descriptor: &QueryDescriptor) -> bool {
    if !policy::is_visible(row, descriptor.include_inactive) {
        return false;
    }
    descriptor
        .filters
        .iter()
        .all(|(field, wanted)| row.get(field).is_some_and(|v| matches_filter(v, wanted)))
}

/// Exact-match semantics for string-typed filter values against stored cells.
fn matches_filter(cell: &Value, wanted: &str) -> bool {
    match cell {
        Value::String(s) => s.trim().eq_ignore_ascii_case(wanted),
        Value::Number(n) => wanted
            .parse::<f64>()
            .ok()
            .zip(n.as_f64())
            .is_some_and(|(a, b)| a == b),
        Value::Bool(b) => wanted.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
        _ => false,
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s.eq_ignore_ascii_case(t),
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn compare_field(a: &Map<String, Value>, b: &Map<String, Value>, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => compare_values(x, y),
        // Missing cells sort last regardless of direction.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => Ordering::Equal,
    }
}
