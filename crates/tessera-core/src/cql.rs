//! Clause compiler
//!
//! Turns a list of column conditions into canonical parameterized query
//! text plus the ordered parameter values, validating the conditions
//! against the table's declared primary-key order. The text is built
//! structurally from the clause list, so placeholders never depend on
//! literal values: every clause list with the same shape (columns and
//! operators) compiles to the same canonical text and therefore the same
//! fingerprint, which is what the prepared-statement cache keys on.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::clause::{Clause, Operator};
use crate::errors::{Result, TesseraError};
use crate::schema::TableDescriptor;
use crate::value::Value;

/// Statement kind a where clause compiles into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVerb {
    /// `SELECT * FROM ks.tbl WHERE ...`
    Select,
    /// `SELECT COUNT(*) FROM ks.tbl WHERE ... [LIMIT n]`
    SelectCount { limit: Option<u32> },
    /// `DELETE FROM ks.tbl WHERE ...`
    Delete,
}

/// Canonical query text and its cache key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// Final query string with positional placeholders
    pub text: String,
    /// Hex SHA-256 of the canonical text; shared by all clause lists whose
    /// shape normalizes to the same text
    pub fingerprint: String,
}

impl CompiledQuery {
    fn new(text: String) -> Self {
        let fingerprint = hex::encode(Sha256::digest(text.as_bytes()));
        Self { text, fingerprint }
    }
}

/// A compiled where clause: canonical query plus ordered parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWhere {
    pub query: CompiledQuery,
    /// Clause values, in matched (primary-key) order
    pub params: Vec<Value>,
}

/// Compile a list of column conditions against the declared primary key
///
/// Clauses must name primary-key columns in declared order: partition-key
/// columns first, then clustering columns, no gaps.
///
/// # Errors
///
/// - `InvalidQuery` when the clause list is empty
/// - `KeysOutOfOrder` when a clause names a primary-key column out of its
///   declared position
/// - `ColumnNotInPrimaryKey` when a clause names a column outside the
///   primary key, or more clauses are supplied than there are key columns
pub fn compile_where(
    descriptor: &TableDescriptor,
    verb: QueryVerb,
    clauses: &[Clause],
) -> Result<CompiledWhere> {
    if clauses.is_empty() {
        return Err(TesseraError::invalid_query(
            "a conditional statement requires at least one clause",
        ));
    }

    let primary_key = descriptor.primary_key();
    let mut text = skeleton(descriptor, verb);
    let mut params = Vec::with_capacity(clauses.len());

    text.push_str(" WHERE ");

    for (position, clause) in clauses.iter().enumerate() {
        let expected = primary_key.get(position).ok_or_else(|| {
            TesseraError::ColumnNotInPrimaryKey {
                column: clause.column.clone(),
            }
        })?;

        if clause.column != *expected {
            return Err(if primary_key.contains(&clause.column) {
                TesseraError::KeysOutOfOrder {
                    column: clause.column.clone(),
                    expected: expected.clone(),
                }
            } else {
                TesseraError::ColumnNotInPrimaryKey {
                    column: clause.column.clone(),
                }
            });
        }

        if position > 0 {
            text.push_str(" AND ");
        }
        text.push_str(&clause.column);
        match clause.operator {
            Operator::In => text.push_str(" IN (?)"),
            op => {
                text.push(' ');
                text.push_str(op.symbol());
                text.push_str(" ?");
            }
        }
        params.push(clause.value.clone());
    }

    if let QueryVerb::SelectCount { limit: Some(limit) } = verb {
        text.push_str(&format!(" LIMIT {}", limit));
    }

    Ok(CompiledWhere {
        query: CompiledQuery::new(text),
        params,
    })
}

/// Compile a full-table scan, with an optional row limit
pub fn compile_select_all(descriptor: &TableDescriptor, limit: Option<u32>) -> CompiledQuery {
    let mut text = format!("SELECT * FROM {}", descriptor.qualified_name());
    if let Some(limit) = limit {
        text.push_str(&format!(" LIMIT {}", limit));
    }
    CompiledQuery::new(text)
}

/// Compile an insert over the model's full declared column list
///
/// Parameter order follows the declared column order, so the bound values
/// come straight from `Model::column_values`.
pub fn compile_insert(descriptor: &TableDescriptor) -> CompiledQuery {
    let columns = descriptor.columns().join(", ");
    let placeholders = vec!["?"; descriptor.columns().len()].join(", ");
    CompiledQuery::new(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        descriptor.qualified_name(),
        columns,
        placeholders
    ))
}

fn skeleton(descriptor: &TableDescriptor, verb: QueryVerb) -> String {
    match verb {
        QueryVerb::Select => format!("SELECT * FROM {}", descriptor.qualified_name()),
        QueryVerb::SelectCount { .. } => {
            format!("SELECT COUNT(*) FROM {}", descriptor.qualified_name())
        }
        QueryVerb::Delete => format!("DELETE FROM {}", descriptor.qualified_name()),
    }
}
