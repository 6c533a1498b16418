//! Shared test support: an in-memory database gateway and fixture models
//!
//! The gateway interprets the small statement dialect the clause compiler
//! emits (parameterized SELECT / INSERT / DELETE / COUNT over one table),
//! which is enough to run the DAO end to end without a live store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tessera_core::{
    ColumnSpec, ConsistencyLevel, ExecutionErrorKind, Model, Result, Row, RowSet, TableMetadata,
    TesseraError, Value,
};
use tessera_store::{BoundStatement, DatabaseGateway, PreparedHandle};

/// One recorded `execute` call, for assertions
#[derive(Debug, Clone)]
pub struct RecordedExecution {
    pub cql: String,
    pub params: Vec<Value>,
    pub consistency: Option<ConsistencyLevel>,
}

/// In-memory gateway speaking the compiler's statement dialect
#[derive(Default)]
pub struct InMemoryGateway {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    next_handle: AtomicU64,
    prepare_counts: Mutex<HashMap<String, u64>>,
    executions: Mutex<Vec<RecordedExecution>>,
    fail_executes: AtomicBool,
    prepare_delay: Mutex<Option<Duration>>,
    execute_delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl InMemoryGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many times the given statement text was prepared
    pub fn prepare_count(&self, cql: &str) -> u64 {
        self.prepare_counts
            .lock()
            .unwrap()
            .get(cql)
            .copied()
            .unwrap_or(0)
    }

    /// Total prepare calls across all statement texts
    pub fn total_prepares(&self) -> u64 {
        self.prepare_counts.lock().unwrap().values().sum()
    }

    /// Recorded `execute` calls, in submission order
    pub fn executions(&self) -> Vec<RecordedExecution> {
        self.executions.lock().unwrap().clone()
    }

    /// Make every subsequent `execute` fail with an unavailable error
    pub fn fail_executes(&self) {
        self.fail_executes.store(true, AtomicOrdering::SeqCst);
    }

    /// Delay every `prepare` (to widen race windows in cache tests)
    pub fn set_prepare_delay(&self, delay: Duration) {
        *self.prepare_delay.lock().unwrap() = Some(delay);
    }

    /// Delay every `execute` (to trigger deadlines)
    pub fn set_execute_delay(&self, delay: Duration) {
        *self.execute_delay.lock().unwrap() = Some(delay);
    }

    /// Rows currently stored for a qualified table name
    pub fn stored_rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn run(&self, statement: &BoundStatement) -> Result<RowSet> {
        let text = statement.handle.cql.as_ref().to_string();

        // Strip a trailing LIMIT before parsing the rest.
        let (text, limit) = match text.rfind(" LIMIT ") {
            Some(idx) => {
                let limit: usize = text[idx + 7..]
                    .parse()
                    .map_err(|_| bad_statement(&text))?;
                (text[..idx].to_string(), Some(limit))
            }
            None => (text, None),
        };

        if let Some(rest) = text.strip_prefix("INSERT INTO ") {
            return self.run_insert(rest, &statement.params, &text);
        }
        if let Some(rest) = text.strip_prefix("SELECT COUNT(*) FROM ") {
            let rows = self.run_select(rest, &statement.params, &text)?;
            let count = limit.map_or(rows.len(), |l| rows.len().min(l)) as i64;
            return Ok(RowSet::from_rows(vec![Row::new().with("count", count)]));
        }
        if let Some(rest) = text.strip_prefix("SELECT * FROM ") {
            let mut rows = self.run_select(rest, &statement.params, &text)?;
            if let Some(limit) = limit {
                rows.truncate(limit);
            }
            return Ok(RowSet::from_rows(rows));
        }
        if let Some(rest) = text.strip_prefix("DELETE FROM ") {
            return self.run_delete(rest, &statement.params, &text);
        }
        Err(bad_statement(&text))
    }

    fn run_insert(&self, rest: &str, params: &[Value], text: &str) -> Result<RowSet> {
        let open = rest.find('(').ok_or_else(|| bad_statement(text))?;
        let close = rest.find(')').ok_or_else(|| bad_statement(text))?;
        let table = rest[..open].trim().to_string();
        let columns: Vec<&str> = rest[open + 1..close].split(", ").collect();
        if columns.len() != params.len() {
            return Err(bad_statement(text));
        }

        let mut row = Row::new();
        for (column, value) in columns.iter().zip(params.iter()) {
            row.set(*column, value.clone());
        }

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        rows.retain(|existing| existing != &row);
        rows.push(row);
        Ok(RowSet::applied())
    }

    fn run_select(&self, rest: &str, params: &[Value], text: &str) -> Result<Vec<Row>> {
        let (table, conditions) = parse_where(rest, params, text)?;
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(&table).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|row| conditions.iter().all(|c| c.matches(row)))
            .collect())
    }

    fn run_delete(&self, rest: &str, params: &[Value], text: &str) -> Result<RowSet> {
        let (table, conditions) = parse_where(rest, params, text)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|row| !conditions.iter().all(|c| c.matches(row)));
        }
        Ok(RowSet::applied())
    }
}

#[async_trait]
impl DatabaseGateway for InMemoryGateway {
    async fn prepare(&self, cql: &str) -> Result<PreparedHandle> {
        let delay = *self.prepare_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self
            .prepare_counts
            .lock()
            .unwrap()
            .entry(cql.to_string())
            .or_insert(0) += 1;
        let id = self.next_handle.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(PreparedHandle::new(id, cql))
    }

    async fn execute(&self, statement: BoundStatement) -> Result<RowSet> {
        let delay = *self.execute_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_executes.load(AtomicOrdering::SeqCst) {
            return Err(TesseraError::execution(
                ExecutionErrorKind::Unavailable,
                "not enough replicas",
            ));
        }
        self.executions.lock().unwrap().push(RecordedExecution {
            cql: statement.handle.cql.as_ref().to_string(),
            params: statement.params.clone(),
            consistency: statement.consistency,
        });
        self.run(&statement)
    }
}

fn bad_statement(text: &str) -> TesseraError {
    TesseraError::execution(
        ExecutionErrorKind::Other,
        format!("gateway cannot interpret statement: {}", text),
    )
}

enum Condition {
    Compare {
        column: String,
        op: String,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
}

impl Condition {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Compare { column, op, value } => {
                let Some(actual) = row.get(column) else {
                    return false;
                };
                let Some(ordering) = compare_values(actual, value) else {
                    return false;
                };
                match op.as_str() {
                    "=" => ordering == Ordering::Equal,
                    "<" => ordering == Ordering::Less,
                    "<=" => ordering != Ordering::Greater,
                    ">" => ordering == Ordering::Greater,
                    ">=" => ordering != Ordering::Less,
                    _ => false,
                }
            }
            Condition::In { column, values } => row
                .get(column)
                .map(|actual| values.contains(actual))
                .unwrap_or(false),
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::BigInt(x), Value::BigInt(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Uuid(x), Value::Uuid(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn parse_where(rest: &str, params: &[Value], text: &str) -> Result<(String, Vec<Condition>)> {
    let Some((table, clause_text)) = rest.split_once(" WHERE ") else {
        return Ok((rest.trim().to_string(), Vec::new()));
    };

    let mut conditions = Vec::new();
    let mut params = params.iter();
    for raw in clause_text.split(" AND ") {
        if let Some(column) = raw.strip_suffix(" IN (?)") {
            let value = params.next().ok_or_else(|| bad_statement(text))?;
            let Value::List(values) = value.clone() else {
                return Err(bad_statement(text));
            };
            conditions.push(Condition::In {
                column: column.to_string(),
                values,
            });
            continue;
        }

        let mut parts = raw.split_whitespace();
        let (Some(column), Some(op), Some("?")) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(bad_statement(text));
        };
        let value = params.next().ok_or_else(|| bad_statement(text))?.clone();
        conditions.push(Condition::Compare {
            column: column.to_string(),
            op: op.to_string(),
            value,
        });
    }

    Ok((table.trim().to_string(), conditions))
}

// ===== Fixture models =====

/// Model over a table with one string partition key and one clustering key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSimple {
    pub partition_key: Option<String>,
    pub cluster_key: Option<String>,
    pub data: Option<String>,
}

#[allow(dead_code)]
impl StringSimple {
    pub fn new(partition_key: &str, cluster_key: &str, data: &str) -> Self {
        Self {
            partition_key: Some(partition_key.to_string()),
            cluster_key: Some(cluster_key.to_string()),
            data: Some(data.to_string()),
        }
    }
}

impl Model for StringSimple {
    fn table_metadata() -> TableMetadata {
        TableMetadata::new("tessera_test", "string_simple")
            .column(ColumnSpec::partition_key("partition_key", 0))
            .column(ColumnSpec::clustering_column("cluster_key", 0))
            .column(ColumnSpec::regular("data"))
    }

    fn primary_key_values(&self) -> Vec<Option<Value>> {
        vec![
            self.partition_key.clone().map(Value::Text),
            self.cluster_key.clone().map(Value::Text),
        ]
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.partition_key.clone().into(),
            self.cluster_key.clone().into(),
            self.data.clone().into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            partition_key: row.get_text("partition_key").map(String::from),
            cluster_key: row.get_text("cluster_key").map(String::from),
            data: row.get_text("data").map(String::from),
        })
    }
}

/// Model over a table with a compound partition key and two clustering keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongCompound {
    pub partition_key1: Option<i64>,
    pub partition_key2: Option<i64>,
    pub cluster_key1: Option<i64>,
    pub cluster_key2: Option<i64>,
    pub data: Option<i64>,
}

impl Model for LongCompound {
    fn table_metadata() -> TableMetadata {
        TableMetadata::new("tessera_test", "long_compound")
            .column(ColumnSpec::partition_key("partition_key1", 0))
            .column(ColumnSpec::partition_key("partition_key2", 1))
            .column(ColumnSpec::clustering_column("cluster_key1", 0))
            .column(ColumnSpec::clustering_column("cluster_key2", 1))
            .column(ColumnSpec::regular("data"))
    }

    fn primary_key_values(&self) -> Vec<Option<Value>> {
        vec![
            self.partition_key1.map(Value::BigInt),
            self.partition_key2.map(Value::BigInt),
            self.cluster_key1.map(Value::BigInt),
            self.cluster_key2.map(Value::BigInt),
        ]
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.partition_key1.into(),
            self.partition_key2.into(),
            self.cluster_key1.into(),
            self.cluster_key2.into(),
            self.data.into(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            partition_key1: row.get_bigint("partition_key1"),
            partition_key2: row.get_bigint("partition_key2"),
            cluster_key1: row.get_bigint("cluster_key1"),
            cluster_key2: row.get_bigint("cluster_key2"),
            data: row.get_bigint("data"),
        })
    }
}
