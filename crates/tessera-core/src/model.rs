//! Model trait and entity-to-clause projection
//!
//! A model type declares its table mapping once (no runtime field
//! introspection) and exposes its key and column values in declared order.
//! `project_clauses` turns a partially-populated model into the equality
//! clauses for whichever contiguous primary-key prefix is set.

use crate::clause::Clause;
use crate::errors::Result;
use crate::schema::{TableDescriptor, TableMetadata};
use crate::value::{Row, Value};

/// A typed domain object mapped onto one table
pub trait Model: Sized + Send + Sync + 'static {
    /// Declared table mapping; validated once at DAO construction
    fn table_metadata() -> TableMetadata;

    /// Primary-key values aligned with the descriptor's primary-key order
    /// (partition-key columns first, then clustering columns, by ordinal);
    /// `None` marks an unset field
    fn primary_key_values(&self) -> Vec<Option<Value>>;

    /// All column values in declared column order, for inserts; unset
    /// fields yield `Value::Null`
    fn column_values(&self) -> Vec<Value>;

    /// Decode one row into a model instance
    ///
    /// # Errors
    ///
    /// Returns `Mapping` when a column has an unexpected type.
    fn from_row(row: &Row) -> Result<Self>;
}

/// Project a partially-populated model into equality clauses
///
/// Walks the primary key in ordinal order and emits `column = value` for
/// each set field, stopping at the first unset one: a compound key lookup
/// is only valid for a contiguous prefix, so fields after a gap are not
/// considered. Zero set fields yields an empty clause list.
pub fn project_clauses(descriptor: &TableDescriptor, key_values: &[Option<Value>]) -> Vec<Clause> {
    descriptor
        .primary_key()
        .iter()
        .zip(key_values.iter())
        .map_while(|(column, value)| {
            value
                .as_ref()
                .filter(|v| !v.is_null())
                .map(|v| Clause::eq(column.clone(), v.clone()))
        })
        .collect()
}
