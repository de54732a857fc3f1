//! Invariant validator: per-entity rule tables evaluated before persistence.
//!
//! Pure functions, no I/O. All violations are aggregated so the caller can
//! report every problem in one response. Uniqueness and reference existence
//! are not checked here; they need store round-trips.

use crate::catalog::types::{EntityConfig, EntityRules, FieldRule, RangeRule};
use crate::error::FieldError;
use crate::registry::EnumRegistry;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub struct InvariantValidator;

impl InvariantValidator {
    /// Full-payload validation for create. Canonicalizes closed-set tokens,
    /// sanitizes list fields, and computes derived fields in place.
    pub fn validate_create(
        registry: &EnumRegistry,
        config: &EntityConfig,
        payload: &mut HashMap<String, Value>,
    ) -> Vec<FieldError> {
        strip_derived_targets(&config.rules, payload);
        let mut errors = Vec::new();
        check_fields(registry, &config.rules, payload, false, &mut errors);
        for range in &config.rules.range_rules {
            check_range(range, payload, None, &mut errors);
        }
        if errors.is_empty() {
            compute_derived(&config.rules, payload, None);
        }
        errors
    }

    /// Partial-update validation. Only fields present in the payload are
    /// checked; range pairs and derived fields are resolved against `prior`
    /// for whichever side the payload does not supply.
    pub fn validate_patch(
        registry: &EnumRegistry,
        config: &EntityConfig,
        payload: &mut HashMap<String, Value>,
        prior: &Map<String, Value>,
    ) -> Vec<FieldError> {
        strip_derived_targets(&config.rules, payload);
        let mut errors = Vec::new();
        check_fields(registry, &config.rules, payload, true, &mut errors);
        for range in &config.rules.range_rules {
            check_range(range, payload, Some(prior), &mut errors);
        }
        if errors.is_empty() {
            compute_derived(&config.rules, payload, Some(prior));
        }
        errors
    }
}

fn strip_derived_targets(rules: &EntityRules, payload: &mut HashMap<String, Value>) {
    for derived in &rules.derived_fields {
        payload.remove(&derived.field);
    }
}

fn check_fields(
    registry: &EnumRegistry,
    rules: &EntityRules,
    payload: &mut HashMap<String, Value>,
    partial: bool,
    errors: &mut Vec<FieldError>,
) {
    for (field, rule) in &rules.fields {
        match payload.get(field) {
            None => {
                if rule.required && !partial {
                    errors.push(FieldError::new(field, format!("{field} is required")));
                }
            }
            Some(Value::Null) => {
                // Explicit null clears an optional field; required fields
                // cannot be cleared.
                if rule.required {
                    errors.push(FieldError::new(field, format!("{field} is required")));
                }
            }
            Some(_) => {
                if let Some(normalized) = check_present_field(registry, field, rule, payload, errors)
                {
                    payload.insert(field.clone(), normalized);
                }
            }
        }
    }
}

/// Validate one present field; returns a replacement value when the input
/// was normalized (canonical enum token, sanitized list).
fn check_present_field(
    registry: &EnumRegistry,
    field: &str,
    rule: &FieldRule,
    payload: &HashMap<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let value = &payload[field];

    if rule.list {
        return check_list_field(registry, field, rule, value, errors);
    }

    if let Some(kind) = &rule.vocabulary {
        let Some(s) = value.as_str() else {
            errors.push(FieldError::new(field, format!("{field} must be a string")));
            return None;
        };
        return match registry.canonical(kind, s) {
            Some(token) => Some(Value::String(token.to_string())),
            None => {
                errors.push(FieldError::new(
                    field,
                    format!("{field} must be one of: {}", registry.allowed_list(kind)),
                ));
                None
            }
        };
    }

    if let Some(max) = rule.max_length {
        if let Some(s) = value.as_str() {
            if s.chars().count() > max {
                errors.push(FieldError::new(
                    field,
                    format!("{field} must be at most {max} characters"),
                ));
            }
        }
    }

    if rule.integer && value.as_i64().is_none() && value.as_u64().is_none() {
        errors.push(FieldError::new(field, format!("{field} must be an integer")));
        return None;
    }

    if rule.minimum.is_some() || rule.maximum.is_some() {
        let Some(n) = value.as_f64() else {
            errors.push(FieldError::new(field, format!("{field} must be a number")));
            return None;
        };
        if let Some(min) = rule.minimum {
            if n < min {
                errors.push(FieldError::new(field, format!("{field} must be at least {min}")));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                errors.push(FieldError::new(field, format!("{field} must be at most {max}")));
            }
        }
    }

    None
}

fn check_list_field(
    registry: &EnumRegistry,
    field: &str,
    rule: &FieldRule,
    value: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(items) = value.as_array() else {
        errors.push(FieldError::new(
            field,
            format!("{field} must be an array of strings"),
        ));
        return None;
    };
    let Some(mut sanitized) = sanitize_string_list(items) else {
        errors.push(FieldError::new(
            field,
            format!("{field} must be an array of strings"),
        ));
        return None;
    };
    if sanitized.is_empty() {
        errors.push(FieldError::new(
            field,
            format!("{field} must contain at least one non-empty entry"),
        ));
        return None;
    }
    if let Some(kind) = &rule.list_vocabulary {
        let mut canonical = Vec::with_capacity(sanitized.len());
        for item in &sanitized {
            match registry.canonical(kind, item) {
                Some(token) => canonical.push(token.to_string()),
                None => {
                    errors.push(FieldError::new(
                        field,
                        format!("{field} must be one of: {}", registry.allowed_list(kind)),
                    ));
                    return None;
                }
            }
        }
        sanitized = canonical;
    }
    Some(Value::Array(sanitized.into_iter().map(Value::String).collect()))
}

/// Trim entries, drop blanks, dedup case-insensitively keeping the first
/// occurrence's casing. None when any entry is not a string.
fn sanitize_string_list(items: &[Value]) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let trimmed = item.as_str()?.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(trimmed.to_string());
        }
    }
    Some(out)
}

fn number_at<'a>(
    field: &str,
    payload: &'a HashMap<String, Value>,
    prior: Option<&'a Map<String, Value>>,
) -> (Option<f64>, bool) {
    // An explicit null in the payload clears the bound rather than falling
    // back to the stored value.
    if let Some(v) = payload.get(field) {
        return (v.as_f64(), true);
    }
    (prior.and_then(|p| p.get(field)).and_then(Value::as_f64), false)
}

fn check_range(
    range: &RangeRule,
    payload: &HashMap<String, Value>,
    prior: Option<&Map<String, Value>>,
    errors: &mut Vec<FieldError>,
) {
    let (min, min_from_payload) = number_at(&range.min_field, payload, prior);
    let (max, _) = number_at(&range.max_field, payload, prior);
    let (Some(min), Some(max)) = (min, max) else {
        return;
    };
    let violated = if range.allow_equal { min > max } else { min >= max };
    if !violated {
        return;
    }
    // Attribute the error to the bound the caller supplied.
    if min_from_payload {
        errors.push(FieldError::new(
            &range.min_field,
            format!("{} is greater than {}", range.min_field, range.max_field),
        ));
    } else {
        errors.push(FieldError::new(
            &range.max_field,
            format!("{} is lesser than {}", range.max_field, range.min_field),
        ));
    }
}

fn compute_derived(
    rules: &EntityRules,
    payload: &mut HashMap<String, Value>,
    prior: Option<&Map<String, Value>>,
) {
    for derived in &rules.derived_fields {
        let triggered = match prior {
            // Create: the payload is the whole record.
            None => true,
            Some(_) => derived.inputs.iter().any(|input| payload.contains_key(input)),
        };
        if !triggered {
            continue;
        }
        let merged = merge_view(payload, prior);
        match (derived.compute)(&merged) {
            Some(value) => {
                payload.insert(derived.field.clone(), value);
            }
            None => {
                payload.insert(derived.field.clone(), Value::Null);
            }
        }
    }
}

/// Prior record overlaid with the payload; explicit nulls remove fields.
fn merge_view(payload: &HashMap<String, Value>, prior: Option<&Map<String, Value>>) -> Map<String, Value> {
    let mut merged = prior.cloned().unwrap_or_default();
    for (k, v) in payload {
        if v.is_null() {
            merged.remove(k);
        } else {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}
