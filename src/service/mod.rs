//! CatalogService: engine orchestration over a repository, plus the
//! invariant validator it runs on the write path.

mod catalog;
mod validation;

pub use catalog::CatalogService;
pub use validation::InvariantValidator;
