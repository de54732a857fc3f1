//! hortica: catalog query & invariant engine for horticultural reference data.
//!
//! One configurable engine replaces the per-resource copies of pagination,
//! sorting, filtering, and write-path invariants: entity behavior is declared
//! as data ([`catalog::EntityConfig`]) and executed by shared components. The
//! persistence layer stays behind the [`store::CatalogStore`] trait.

pub mod case;
pub mod catalog;
pub mod error;
pub mod policy;
pub mod query;
pub mod registry;
pub mod response;
pub mod service;
pub mod store;

pub use catalog::{CatalogModel, DeleteMode, EntityConfig, EntityKind};
pub use error::{ConfigError, EngineError, ErrorBody, FieldError};
pub use query::{PageMeta, QueryDescriptor, QueryNormalizer, SortOrder};
pub use registry::EnumRegistry;
pub use response::{assemble, ListPage};
pub use service::{CatalogService, InvariantValidator};
pub use store::{CatalogStore, MemoryStore};
