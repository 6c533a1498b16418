//! Column conditions for where clauses
//!
//! A `Clause` is transient: constructed per call, consumed by the clause
//! compiler. `In` carries the whole collection as one `Value::List` so that
//! it binds to a single placeholder.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Comparison operator of a column condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl Operator {
    /// Query-text rendering of this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
        }
    }
}

/// One column condition: column name, operator, value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Clause {
    fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Lte, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Gte, value)
    }

    /// `column IN (values)`, the collection binding as one placeholder
    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(column, Operator::In, Value::List(values))
    }
}
