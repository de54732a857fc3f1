//! Pagination metadata derived from a total count and a normalized query.

use crate::query::normalize::QueryDescriptor;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    /// Present (true) only when the requested page lies beyond the last page
    /// of a non-empty collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_exceeded_page: Option<bool>,
    /// Present (true) only when the effective page size is the configured cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit_applied: Option<bool>,
}

impl PageMeta {
    pub fn compute(total_items: u64, descriptor: &QueryDescriptor) -> Self {
        let page_size = descriptor.limit;
        let total_pages = (total_items.div_ceil(u64::from(page_size))) as u32;
        let current_page = descriptor.page;
        let exceeded = total_items > 0 && current_page > total_pages;
        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            has_previous_page: current_page > 1,
            has_next_page: current_page < total_pages,
            has_exceeded_page: exceeded.then_some(true),
            max_limit_applied: (page_size == descriptor.max_limit).then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::normalize::SortOrder;

    fn descriptor(page: u32, limit: u32, max_limit: u32) -> QueryDescriptor {
        QueryDescriptor {
            page,
            limit,
            offset: u64::from(page - 1) * u64::from(limit),
            sort_field: "name".into(),
            sort_order: SortOrder::Asc,
            filters: Vec::new(),
            include_inactive: false,
            max_limit,
        }
    }

    #[test]
    fn ninety_five_items_across_ten_pages() {
        let meta = PageMeta::compute(95, &descriptor(1, 10, 100));
        assert_eq!(meta.total_pages, 10);
        assert!(!meta.has_previous_page);
        assert!(meta.has_next_page);
        assert_eq!(meta.has_exceeded_page, None);
    }

    #[test]
    fn page_beyond_total_is_flagged_not_an_error() {
        let meta = PageMeta::compute(95, &descriptor(11, 10, 100));
        assert_eq!(meta.has_exceeded_page, Some(true));
        assert!(meta.has_previous_page);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn exceeded_flag_omitted_for_empty_collections() {
        let meta = PageMeta::compute(0, &descriptor(5, 10, 100));
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.has_exceeded_page, None);
    }

    #[test]
    fn clamped_limit_reports_max_applied() {
        let meta = PageMeta::compute(10, &descriptor(1, 100, 100));
        assert_eq!(meta.max_limit_applied, Some(true));
        let meta = PageMeta::compute(10, &descriptor(1, 20, 100));
        assert_eq!(meta.max_limit_applied, None);
    }

    #[test]
    fn optional_flags_absent_from_serialized_form() {
        let meta = PageMeta::compute(95, &descriptor(2, 10, 100));
        let v = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["currentPage"], 2);
        assert_eq!(v["totalItems"], 95);
        assert!(v.get("hasExceededPage").is_none());
        assert!(v.get("maxLimitApplied").is_none());
    }
}
