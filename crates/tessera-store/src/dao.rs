//! Typed DAO over one table
//!
//! A `Dao<M, G>` maps the model type `M` onto its declared table and runs
//! reads, writes, and deletes through the external gateway `G`. Statement
//! flow for conditional operations: clause compiler → prepared-statement
//! cache → bind → async execution → result future. Compilation errors are
//! returned synchronously from the submitting call; execution errors travel
//! through the returned future.

use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tessera_core::{
    cql, project_clauses, Clause, ConsistencyDefaults, ConsistencyOverride, Model,
    OperationKind, QueryVerb, Result, TableDescriptor, TesseraError, Value,
};
use tracing::debug;

use crate::executor::{count_mapper, execute_async, row_mapper, MapMode};
use crate::gateway::{BoundStatement, DatabaseGateway};
use crate::result_future::ResultFuture;
use crate::statement_cache::PreparedStatementCache;

/// Construction-time DAO configuration
#[derive(Debug, Clone)]
pub struct DaoConfig {
    /// Process-wide consistency defaults for this DAO's operations
    pub consistency: ConsistencyDefaults,
    /// Bound on the prepared-statement cache
    pub statement_cache_capacity: NonZeroUsize,
    /// Deadline applied when the call context does not carry one
    pub default_deadline: Option<Duration>,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            consistency: ConsistencyDefaults::default(),
            statement_cache_capacity: NonZeroUsize::new(1024)
                .expect("default cache capacity is non-zero"),
            default_deadline: None,
        }
    }
}

/// Per-call context threaded from the request boundary
///
/// Carries the request-scoped consistency override and an optional
/// deadline. Passed by reference into every operation so concurrent
/// requests stay isolated from each other.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub consistency: ConsistencyOverride,
    pub deadline: Option<Duration>,
}

impl CallContext {
    /// Context with defaults only: no override, no extra deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying a consistency override
    pub fn with_consistency(consistency: ConsistencyOverride) -> Self {
        Self {
            consistency,
            deadline: None,
        }
    }
}

/// Data-access object for one model type over one table
pub struct Dao<M: Model, G: DatabaseGateway> {
    gateway: Arc<G>,
    descriptor: TableDescriptor,
    statements: PreparedStatementCache,
    config: DaoConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model, G: DatabaseGateway> Dao<M, G> {
    /// Build the DAO, validating the model's declared table metadata
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the metadata is missing or invalid.
    pub fn new(gateway: Arc<G>, config: DaoConfig) -> Result<Self> {
        let descriptor = TableDescriptor::from_metadata(&M::table_metadata())?;
        debug!(
            table = %descriptor.qualified_name(),
            primary_key = ?descriptor.primary_key(),
            "constructed DAO"
        );
        Ok(Self {
            gateway,
            statements: PreparedStatementCache::new(config.statement_cache_capacity),
            descriptor,
            config,
            _model: PhantomData,
        })
    }

    /// The validated table descriptor
    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Get a record by its full primary key
    ///
    /// The values must correspond to the columns composing the primary key,
    /// in declared order.
    pub async fn get_one(&self, ctx: &CallContext, primary_key: &[Value]) -> Result<ResultFuture<M>> {
        let clauses = self.key_clauses(self.descriptor.primary_key(), primary_key, true)?;
        self.run_where(ctx, QueryVerb::Select, &clauses, OperationKind::Read, MapMode::Single)
            .await
    }

    /// Get all records in a row by its partition key
    ///
    /// The values must correspond to the columns composing the partition
    /// key, in declared order.
    pub async fn get_row(
        &self,
        ctx: &CallContext,
        partition_key: &[Value],
    ) -> Result<ResultFuture<M>> {
        let clauses = self.key_clauses(self.descriptor.partition_key(), partition_key, false)?;
        self.run_where(ctx, QueryVerb::Select, &clauses, OperationKind::Read, MapMode::List)
            .await
    }

    /// Get records matching the supplied conditions
    ///
    /// Conditions must follow the declared primary-key order; only
    /// primary-key columns are queryable (no secondary indexes).
    pub async fn get_where(&self, ctx: &CallContext, clauses: &[Clause]) -> Result<ResultFuture<M>> {
        self.run_where(ctx, QueryVerb::Select, clauses, OperationKind::Read, MapMode::List)
            .await
    }

    /// Get records matching whichever primary-key fields are set on the
    /// model; depending on the set prefix this behaves like `get_one`,
    /// `get_row`, or `get_where`
    pub async fn get(&self, ctx: &CallContext, model: &M) -> Result<ResultFuture<M>> {
        let clauses = project_clauses(&self.descriptor, &model.primary_key_values());
        self.run_where(ctx, QueryVerb::Select, &clauses, OperationKind::Read, MapMode::List)
            .await
    }

    /// Get all records in the table, optionally bounded
    pub async fn get_table(
        &self,
        ctx: &CallContext,
        limit: Option<u32>,
    ) -> Result<ResultFuture<M>> {
        let query = cql::compile_select_all(&self.descriptor, limit);
        let handle = self.statements.get_or_prepare(self.gateway.as_ref(), &query).await?;
        let statement = BoundStatement {
            handle,
            params: Vec::new(),
            consistency: self
                .config
                .consistency
                .resolve(OperationKind::Read, &ctx.consistency),
        };
        Ok(execute_async(
            Arc::clone(&self.gateway),
            statement,
            OperationKind::Read,
            self.deadline(ctx),
            row_mapper::<M>(MapMode::List),
        ))
    }

    /// Count rows matching the conditions
    ///
    /// Can be very expensive on wide partitions; `limit` bounds the count.
    pub async fn get_count(
        &self,
        ctx: &CallContext,
        clauses: &[Clause],
        limit: Option<u32>,
    ) -> Result<ResultFuture<i64>> {
        let compiled = cql::compile_where(&self.descriptor, QueryVerb::SelectCount { limit }, clauses)?;
        let handle = self
            .statements
            .get_or_prepare(self.gateway.as_ref(), &compiled.query)
            .await?;
        let statement = BoundStatement {
            handle,
            params: compiled.params,
            consistency: self
                .config
                .consistency
                .resolve(OperationKind::Read, &ctx.consistency),
        };
        Ok(execute_async(
            Arc::clone(&self.gateway),
            statement,
            OperationKind::Read,
            self.deadline(ctx),
            count_mapper(),
        ))
    }

    /// Insert or update a single record (the store makes no distinction)
    pub async fn put_one(&self, ctx: &CallContext, model: &M) -> Result<ResultFuture<M>> {
        let query = cql::compile_insert(&self.descriptor);
        let handle = self.statements.get_or_prepare(self.gateway.as_ref(), &query).await?;
        let statement = BoundStatement {
            handle,
            params: model.column_values(),
            consistency: self
                .config
                .consistency
                .resolve(OperationKind::Write, &ctx.consistency),
        };
        Ok(execute_async(
            Arc::clone(&self.gateway),
            statement,
            OperationKind::Write,
            self.deadline(ctx),
            row_mapper::<M>(MapMode::Unmapped),
        ))
    }

    /// Delete a single record by its full primary key
    pub async fn delete_one(
        &self,
        ctx: &CallContext,
        primary_key: &[Value],
    ) -> Result<ResultFuture<M>> {
        let clauses = self.key_clauses(self.descriptor.primary_key(), primary_key, true)?;
        self.run_where(ctx, QueryVerb::Delete, &clauses, OperationKind::Write, MapMode::Unmapped)
            .await
    }

    /// Delete all records in a row by its partition key
    pub async fn delete_row(
        &self,
        ctx: &CallContext,
        partition_key: &[Value],
    ) -> Result<ResultFuture<M>> {
        let clauses = self.key_clauses(self.descriptor.partition_key(), partition_key, false)?;
        self.run_where(ctx, QueryVerb::Delete, &clauses, OperationKind::Write, MapMode::Unmapped)
            .await
    }

    /// Delete records matching the supplied conditions
    pub async fn delete_where(
        &self,
        ctx: &CallContext,
        clauses: &[Clause],
    ) -> Result<ResultFuture<M>> {
        self.run_where(ctx, QueryVerb::Delete, clauses, OperationKind::Write, MapMode::Unmapped)
            .await
    }

    /// Delete records matching whichever primary-key fields are set on the
    /// model
    pub async fn delete(&self, ctx: &CallContext, model: &M) -> Result<ResultFuture<M>> {
        let clauses = project_clauses(&self.descriptor, &model.primary_key_values());
        self.run_where(ctx, QueryVerb::Delete, &clauses, OperationKind::Write, MapMode::Unmapped)
            .await
    }

    async fn run_where(
        &self,
        ctx: &CallContext,
        verb: QueryVerb,
        clauses: &[Clause],
        kind: OperationKind,
        mode: MapMode,
    ) -> Result<ResultFuture<M>> {
        let compiled = cql::compile_where(&self.descriptor, verb, clauses)?;
        let handle = self
            .statements
            .get_or_prepare(self.gateway.as_ref(), &compiled.query)
            .await?;
        let statement = BoundStatement {
            handle,
            params: compiled.params,
            consistency: self.config.consistency.resolve(kind, &ctx.consistency),
        };
        Ok(execute_async(
            Arc::clone(&self.gateway),
            statement,
            kind,
            self.deadline(ctx),
            row_mapper::<M>(mode),
        ))
    }

    /// Build equality clauses pairing key columns with supplied values
    ///
    /// With `exact` the value count must equal the column count (point
    /// lookups); otherwise a shorter prefix is allowed but never more
    /// values than columns.
    fn key_clauses(&self, columns: &[String], values: &[Value], exact: bool) -> Result<Vec<Clause>> {
        if values.len() > columns.len() || (exact && values.len() != columns.len()) {
            return Err(TesseraError::invalid_query(format!(
                "wrong key count: got {} values for {} key columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(columns
            .iter()
            .zip(values.iter())
            .map(|(column, value)| Clause::eq(column.clone(), value.clone()))
            .collect())
    }

    fn deadline(&self, ctx: &CallContext) -> Option<Duration> {
        ctx.deadline.or(self.config.default_deadline)
    }
}
