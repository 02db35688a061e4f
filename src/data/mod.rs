//! Table loading: CSV artefacts into validated, typed relations.

pub mod loader;
pub mod relation;
pub mod schema;

pub use loader::load;
pub use relation::{ColumnData, Relation};
pub use schema::{ColumnKind, ColumnSpec, Schema};
