//! List-endpoint query handling: normalization and pagination metadata.

pub mod normalize;
pub mod pagination;

pub use normalize::{QueryDescriptor, QueryNormalizer, SortOrder};
pub use pagination::PageMeta;
