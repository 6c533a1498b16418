//! Column value, row, and row-set model
//!
//! These types stand in for the wire types of the external wide-column
//! store: a `Value` is one column value, a `Row` is an ordered set of named
//! values, and a `RowSet` is what an executed statement returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single column value
///
/// `List` carries the whole collection bound to an `IN` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Text(String),
    BigInt(i64),
    Int(i32),
    Double(f64),
    Boolean(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// True if this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// One row of an executed statement: column name to value, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    /// Set a column value, replacing any existing value under the same name
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        if let Some(slot) = self.columns.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.columns.push((column, value));
        }
    }

    /// Get a column value by name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Get a text column, `None` if absent, null, or a different type
    pub fn get_text(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(Value::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Get a bigint column
    pub fn get_bigint(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(Value::BigInt(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get an int column
    pub fn get_int(&self, column: &str) -> Option<i32> {
        match self.get(column) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a double column
    pub fn get_double(&self, column: &str) -> Option<f64> {
        match self.get(column) {
            Some(Value::Double(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a boolean column
    pub fn get_boolean(&self, column: &str) -> Option<bool> {
        match self.get(column) {
            Some(Value::Boolean(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a uuid column
    pub fn get_uuid(&self, column: &str) -> Option<Uuid> {
        match self.get(column) {
            Some(Value::Uuid(v)) => Some(*v),
            _ => None,
        }
    }

    /// Column names in row order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns in this row
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The raw result of an executed statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    /// Returned rows, in store order
    pub rows: Vec<Row>,
    /// Whether a conditional write was applied (always true for plain ops)
    pub was_applied: bool,
}

impl RowSet {
    /// An applied result with no rows (writes, deletes)
    pub fn applied() -> Self {
        Self {
            rows: Vec::new(),
            was_applied: true,
        }
    }

    /// A result carrying the given rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            was_applied: true,
        }
    }

    /// First row, if any
    pub fn one(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
