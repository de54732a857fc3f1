//! Soft-delete policy: logical deletion is a state transition, and default
//! reads exclude inactive records unless the caller opts in.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub const ACTIVE_FIELD: &str = "is_active";
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// Whether a record is visible to a read operation. Hard-delete entities
/// never carry the markers and are always visible.
pub fn is_visible(record: &Map<String, Value>, include_inactive: bool) -> bool {
    if include_inactive {
        return true;
    }
    if record.get(ACTIVE_FIELD).and_then(Value::as_bool) == Some(false) {
        return false;
    }
    !matches!(record.get(DELETED_AT_FIELD), Some(Value::String(_)))
}

/// Transition a record to the deleted state.
pub fn mark_deleted(record: &mut Map<String, Value>, now: DateTime<Utc>) {
    record.insert(ACTIVE_FIELD.to_string(), Value::Bool(false));
    record.insert(DELETED_AT_FIELD.to_string(), Value::String(now.to_rfc3339()));
}
