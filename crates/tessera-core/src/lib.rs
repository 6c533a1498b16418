//! Tessera core - domain half of the typed wide-column data-access layer
//!
//! Provides:
//! - Error taxonomy with stable codes
//! - Column value / row / row-set model
//! - Schema descriptor built from declarative table metadata
//! - Clause model and the structural clause compiler
//! - Consistency-level types and the layered resolver
//! - The `Model` trait and entity-to-clause projection
//!
//! Everything here is pure computation; the async execution half lives in
//! `tessera-store`.

pub mod clause;
pub mod consistency;
pub mod cql;
pub mod errors;
pub mod logging;
pub mod model;
pub mod schema;
pub mod value;

// Re-export key types
pub use clause::{Clause, Operator};
pub use consistency::{
    ConsistencyDefaults, ConsistencyLevel, ConsistencyOverride, OperationKind,
};
pub use cql::{CompiledQuery, CompiledWhere, QueryVerb};
pub use errors::{ExecutionErrorKind, Result, ResultChannel, TesseraError};
pub use model::{project_clauses, Model};
pub use schema::{ColumnRole, ColumnSpec, TableDescriptor, TableMetadata};
pub use value::{Row, RowSet, Value};
