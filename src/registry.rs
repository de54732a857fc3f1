//! Enum registry: closed token sets per categorical field kind.
//!
//! The registry is plain injected data. Both the write path (invariant
//! validation) and the read path (filter validation) resolve membership here,
//! so adding a categorical field is a registration, not an engine change.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct EnumRegistry {
    sets: BTreeMap<String, Vec<String>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the closed set for a field kind. Token order is
    /// preserved and used when the allowed set is reported back to callers.
    pub fn register(&mut self, kind: impl Into<String>, values: &[&str]) {
        self.sets
            .insert(kind.into(), values.iter().map(|v| v.to_string()).collect());
    }

    pub fn values_of(&self, kind: &str) -> Option<&[String]> {
        self.sets.get(kind).map(Vec::as_slice)
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.sets.contains_key(kind)
    }

    /// Membership check: candidate is trimmed and compared case-insensitively.
    pub fn is_member(&self, kind: &str, candidate: &str) -> bool {
        self.canonical(kind, candidate).is_some()
    }

    /// Canonical registry token for a candidate, for normalizing stored values.
    pub fn canonical(&self, kind: &str, candidate: &str) -> Option<&str> {
        let wanted = candidate.trim();
        self.sets.get(kind)?.iter().find_map(|token| {
            if token.eq_ignore_ascii_case(wanted) {
                Some(token.as_str())
            } else {
                None
            }
        })
    }

    /// Comma-joined allowed set for error messages, e.g. "crop, plant".
    pub fn allowed_list(&self, kind: &str) -> String {
        self.values_of(kind).unwrap_or(&[]).join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EnumRegistry {
        let mut r = EnumRegistry::new();
        r.register("plant_category", &["crop", "plant"]);
        r
    }

    #[test]
    fn membership_trims_and_ignores_case() {
        let r = registry();
        assert!(r.is_member("plant_category", "  Crop "));
        assert!(r.is_member("plant_category", "PLANT"));
        assert!(!r.is_member("plant_category", "tree"));
        assert!(!r.is_member("unknown_kind", "crop"));
    }

    #[test]
    fn canonical_returns_registry_casing() {
        let r = registry();
        assert_eq!(r.canonical("plant_category", " CROP"), Some("crop"));
        assert_eq!(r.canonical("plant_category", "shrub"), None);
    }

    #[test]
    fn values_keep_registration_order() {
        let r = registry();
        assert_eq!(r.allowed_list("plant_category"), "crop, plant");
    }
}
