//! Declarative per-entity configuration: field rules, range pairs, derived
//! fields, and query settings. One generic engine consumes these tables
//! instead of one hand-written validator per resource.

use crate::catalog::model::EntityKind;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Per-field validation rule. Closed-set membership goes through the
/// registry by vocabulary kind; everything else is checked in-payload.
#[derive(Clone, Debug, Default)]
pub struct FieldRule {
    /// Enforced on create; an explicit null on patch is also rejected.
    pub required: bool,
    /// Vocabulary kind for a closed-set scalar field.
    pub vocabulary: Option<String>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Numeric field that must be a whole number (e.g. a rank).
    pub integer: bool,
    /// String-array field, sanitized (trim, drop blanks, dedup).
    pub list: bool,
    /// Vocabulary kind each list element must belong to.
    pub list_vocabulary: Option<String>,
    /// Uniqueness is enforced by the store, not the validator.
    pub unique: bool,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn vocabulary(mut self, kind: &str) -> Self {
        self.vocabulary = Some(kind.to_string());
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn minimum(mut self, n: f64) -> Self {
        self.minimum = Some(n);
        self
    }

    pub fn maximum(mut self, n: f64) -> Self {
        self.maximum = Some(n);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn list_vocabulary(mut self, kind: &str) -> Self {
        self.list = true;
        self.list_vocabulary = Some(kind.to_string());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Cross-field ordering constraint between a min/max pair. On partial
/// update the missing side is resolved from the stored record.
#[derive(Clone, Debug)]
pub struct RangeRule {
    pub min_field: String,
    pub max_field: String,
    /// Whether min == max is acceptable (pH yes, day ranges no).
    pub allow_equal: bool,
}

/// Derived-field computation over a merged view of the record. The target is
/// never accepted from callers and is recomputed whenever an input changes.
pub type DeriveFn = fn(&Map<String, Value>) -> Option<Value>;

#[derive(Clone, Debug)]
pub struct DerivedField {
    pub field: String,
    /// Payload fields whose presence triggers recomputation.
    pub inputs: Vec<String>,
    pub compute: DeriveFn,
}

/// Foreign reference whose target must exist (and be visible) at write time.
/// Checked by the service since it needs a store round-trip.
#[derive(Clone, Debug)]
pub struct ReferenceField {
    pub field: String,
    pub target: EntityKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteMode {
    Hard,
    Soft,
}

/// How a filterable field is validated: against a vocabulary kind, or free.
#[derive(Clone, Debug)]
pub enum FilterKind {
    Enum(String),
    Free,
}

/// List-endpoint settings for one entity.
#[derive(Clone, Debug)]
pub struct QueryConfig {
    pub allowed_sort_fields: Vec<String>,
    pub default_sort_field: String,
    pub default_limit: u32,
    pub max_limit: u32,
    pub filterable_fields: HashMap<String, FilterKind>,
}

/// Full rule table for one entity.
#[derive(Clone, Debug, Default)]
pub struct EntityRules {
    pub fields: Vec<(String, FieldRule)>,
    pub range_rules: Vec<RangeRule>,
    pub derived_fields: Vec<DerivedField>,
}

impl EntityRules {
    pub fn rule_for(&self, field: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, r)| r)
    }

    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|(f, _)| f == field)
    }
}

#[derive(Clone, Debug)]
pub struct EntityConfig {
    pub kind: EntityKind,
    pub query: QueryConfig,
    pub rules: EntityRules,
    /// Allow-list for partial updates; keys outside it are stripped.
    pub patchable_fields: Vec<String>,
    pub delete: DeleteMode,
    pub references: Vec<ReferenceField>,
}

impl EntityConfig {
    pub fn is_patchable(&self, field: &str) -> bool {
        self.patchable_fields.iter().any(|f| f == field)
    }

    /// Unique field names, for stores that enforce uniqueness.
    pub fn unique_fields(&self) -> Vec<&str> {
        self.rules
            .fields
            .iter()
            .filter(|(_, r)| r.unique)
            .map(|(f, _)| f.as_str())
            .collect()
    }
}
