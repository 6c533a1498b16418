//! Database gateway seam
//!
//! The external wide-column store is reached through this trait. It is not
//! reimplemented here: `prepare` fails with `Prepare` errors, `execute`
//! with `Execution` errors, and the core adds no retries on top of either.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{ConsistencyLevel, Result, RowSet, Value};

/// Opaque handle to a statement prepared by the gateway
#[derive(Debug, Clone)]
pub struct PreparedHandle {
    /// Gateway-assigned identity
    pub id: u64,
    /// The prepared query text (kept for diagnostics and re-binding)
    pub cql: Arc<str>,
}

impl PreparedHandle {
    pub fn new(id: u64, cql: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            cql: cql.into(),
        }
    }
}

/// A prepared statement bound with parameter values and a resolved
/// consistency level (`None` lets the gateway apply its own default)
#[derive(Debug, Clone)]
pub struct BoundStatement {
    pub handle: PreparedHandle,
    pub params: Vec<Value>,
    pub consistency: Option<ConsistencyLevel>,
}

/// Async primitive surface of the external database gateway
#[async_trait]
pub trait DatabaseGateway: Send + Sync + 'static {
    /// Parse and prepare a query, returning a reusable handle
    async fn prepare(&self, cql: &str) -> Result<PreparedHandle>;

    /// Execute a bound statement and return its row set
    async fn execute(&self, statement: BoundStatement) -> Result<RowSet>;
}
