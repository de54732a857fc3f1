//! Declarative entity model: rule tables, the resolved runtime model, and the
//! startup validator that cross-checks the two.

pub mod defaults;
pub mod model;
pub mod types;
pub mod validator;

pub use model::*;
pub use types::*;
pub use validator::*;
