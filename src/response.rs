//! Result assembler: rows plus pagination metadata in one envelope, the same
//! shape for every list operation. Rows are opaque here; the only touch is
//! camelCasing their keys for the boundary.

use crate::case;
use crate::query::pagination::PageMeta;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ListPage {
    pub data: Vec<Value>,
    pub pagination: PageMeta,
}

pub fn assemble(rows: Vec<Value>, pagination: PageMeta) -> ListPage {
    let data = rows
        .into_iter()
        .map(|mut row| {
            case::value_keys_to_camel_case(&mut row);
            row
        })
        .collect();
    ListPage { data, pagination }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::normalize::{QueryDescriptor, SortOrder};
    use serde_json::json;

    #[test]
    fn envelope_has_data_and_pagination() {
        let descriptor = QueryDescriptor {
            page: 1,
            limit: 10,
            offset: 0,
            sort_field: "name".into(),
            sort_order: SortOrder::Asc,
            filters: Vec::new(),
            include_inactive: false,
            max_limit: 100,
        };
        let page = assemble(
            vec![json!({"ph_type": "acidic", "name": "loam"})],
            PageMeta::compute(1, &descriptor),
        );
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["data"][0]["phType"], "acidic");
        assert_eq!(v["pagination"]["totalItems"], 1);
    }
}
