//! Typed errors and the wire-level error body.

use serde::Serialize;
use thiserror::Error;

/// A single field-level validation violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("entity {entity}: field {field} names unknown vocabulary '{kind}'")]
    MissingVocabulary {
        entity: &'static str,
        field: String,
        kind: String,
    },
    #[error("entity {entity}: default sort field '{field}' is not an allowed sort field")]
    DefaultSortNotAllowed { entity: &'static str, field: String },
    #[error("entity {entity}: rule references undeclared field '{field}'")]
    UnknownRuleField { entity: &'static str, field: String },
    #[error("entity {entity}: derived field '{field}' must not be patchable")]
    DerivedFieldPatchable { entity: &'static str, field: String },
    #[error("duplicate entity config: {0}")]
    DuplicateEntity(&'static str),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("internal: {0}")]
    Internal(String),
}

impl EngineError {
    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation(vec![FieldError::new(field, message)])
    }

    /// Wire shape: `{message, errors: [{field, message}, ...]}`; `errors` is
    /// omitted for non-validation failures.
    pub fn to_body(&self) -> ErrorBody {
        let errors = match self {
            EngineError::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        };
        ErrorBody {
            message: self.to_string(),
            errors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}
