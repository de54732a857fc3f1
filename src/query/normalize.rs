//! Query normalizer: raw page/limit/sort/filter params into a validated,
//! bounded descriptor.
//!
//! Pagination and sort inputs degrade gracefully (bad values fall back to
//! defaults); filter values on closed-set fields are rejected outright so a
//! typo never silently returns the unfiltered collection.

use crate::case::to_snake_case;
use crate::catalog::types::{FilterKind, QueryConfig};
use crate::error::{EngineError, FieldError};
use crate::registry::EnumRegistry;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Immutable, bounded representation of a caller's list request.
#[derive(Clone, Debug)]
pub struct QueryDescriptor {
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
    pub sort_field: String,
    pub sort_order: SortOrder,
    /// Exact-match filters; enum values are already canonicalized.
    pub filters: Vec<(String, String)>,
    pub include_inactive: bool,
    /// Configured cap, carried for pagination metadata.
    pub max_limit: u32,
}

/// Params that are never treated as filters.
const RESERVED_PARAMS: [&str; 5] = ["page", "limit", "sort_by", "sort_order", "include_inactive"];

pub struct QueryNormalizer;

impl QueryNormalizer {
    pub fn normalize(
        registry: &EnumRegistry,
        config: &QueryConfig,
        params: &HashMap<String, String>,
    ) -> Result<QueryDescriptor, EngineError> {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (to_snake_case(k), v.clone()))
            .collect();

        let page = params
            .get("page")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = params
            .get("limit")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(config.default_limit)
            .clamp(1, config.max_limit);

        let sort_field = params
            .get("sort_by")
            .map(|v| to_snake_case(v.trim()))
            .filter(|v| config.allowed_sort_fields.iter().any(|f| f == v))
            .unwrap_or_else(|| config.default_sort_field.clone());

        let sort_order = match params.get("sort_order").map(|v| v.trim().to_ascii_lowercase()) {
            Some(ref v) if v == "desc" => SortOrder::Desc,
            _ => SortOrder::Asc,
        };

        let include_inactive = params
            .get("include_inactive")
            .map(|v| {
                let v = v.trim();
                v.eq_ignore_ascii_case("true") || v == "1"
            })
            .unwrap_or(false);

        let mut filters = Vec::new();
        let mut errors = Vec::new();
        for (key, raw) in &params {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                continue;
            }
            // Keys without a declared filter are ignored, not errors.
            let Some(filter_kind) = config.filterable_fields.get(key) else {
                continue;
            };
            match filter_kind {
                FilterKind::Free => filters.push((key.clone(), raw.trim().to_string())),
                FilterKind::Enum(kind) => match registry.canonical(kind, raw) {
                    Some(token) => filters.push((key.clone(), token.to_string())),
                    None => errors.push(FieldError::new(
                        key.clone(),
                        format!("{} must be one of: {}", key, registry.allowed_list(kind)),
                    )),
                },
            }
        }
        if !errors.is_empty() {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(EngineError::Validation(errors));
        }
        filters.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(QueryDescriptor {
            page,
            limit,
            // Widened before multiplying; page is caller-controlled and the
            // u32 product can overflow.
            offset: u64::from(page - 1) * u64::from(limit),
            sort_field,
            sort_order,
            filters,
            include_inactive,
            max_limit: config.max_limit,
        })
    }
}
