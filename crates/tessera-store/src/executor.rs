//! Execution gateway
//!
//! Submits bound statements to the external database gateway and wires the
//! single asynchronous completion onto a [`ResultFuture`]. The completion
//! fires exactly once per submitted operation: success populates the raw
//! channel and, when mapping was requested, the mapped channel from the
//! same row set; failure populates the error on both channels. An optional
//! deadline bounds the wait, surfacing expiry as a timeout execution error
//! through the future rather than from the submitting call.

use std::sync::Arc;
use std::time::Duration;

use tessera_core::{
    ExecutionErrorKind, Model, OperationKind, Result, RowSet, TesseraError,
};
use tracing::debug;

use crate::gateway::{BoundStatement, DatabaseGateway};
use crate::result_future::{Mapped, ResultFuture};

/// How the raw row set maps onto the caller-visible value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapMode {
    /// No mapping requested: the mapped channel delivers `Absent`
    Unmapped,
    /// A lone row decodes to a single value; several rows still decode to
    /// an ordered sequence
    Single,
    /// List semantics: one row decodes to a one-element sequence
    List,
}

/// Submit a statement and return the future its completion will resolve
///
/// `mapper` runs on the gateway's completion, turning the row set into the
/// mapped outcome; a mapper error is delivered through the future the same
/// way an execution error is.
pub(crate) fn execute_async<T, G, F>(
    gateway: Arc<G>,
    statement: BoundStatement,
    kind: OperationKind,
    deadline: Option<Duration>,
    mapper: F,
) -> ResultFuture<T>
where
    T: Send + 'static,
    G: DatabaseGateway,
    F: FnOnce(&RowSet) -> Result<Mapped<T>> + Send + 'static,
{
    let (future, completion) = ResultFuture::channel();

    tokio::spawn(async move {
        let outcome = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, gateway.execute(statement)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(deadline_error(kind, deadline)),
            },
            None => gateway.execute(statement).await,
        };

        match outcome {
            Ok(rows) => match mapper(&rows) {
                Ok(mapped) => completion.fulfill(mapped, rows),
                Err(error) => completion.fail(error),
            },
            Err(error) => {
                debug!(error = %error, "statement execution failed");
                completion.fail(error);
            }
        }
    });

    future
}

/// Standard row-set mapper for model-typed operations
pub(crate) fn row_mapper<M: Model>(mode: MapMode) -> impl FnOnce(&RowSet) -> Result<Mapped<M>> {
    move |rows: &RowSet| {
        if matches!(mode, MapMode::Unmapped) {
            return Ok(Mapped::Absent);
        }

        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows.rows {
            decoded.push(M::from_row(row)?);
        }

        Ok(match (mode, decoded.len()) {
            (_, 0) => Mapped::Absent,
            (MapMode::Single, 1) => {
                let value = decoded.pop().ok_or_else(|| {
                    TesseraError::mapping("decoded row vanished during mapping")
                })?;
                Mapped::One(value)
            }
            _ => Mapped::Many(decoded),
        })
    }
}

/// Mapper for `SELECT COUNT(*)` results: the count rides in the first row
pub(crate) fn count_mapper() -> impl FnOnce(&RowSet) -> Result<Mapped<i64>> {
    |rows: &RowSet| {
        let Some(row) = rows.one() else {
            return Ok(Mapped::Absent);
        };
        let count = row
            .get_bigint("count")
            .ok_or_else(|| TesseraError::mapping("count row has no bigint 'count' column"))?;
        Ok(Mapped::One(count))
    }
}

fn deadline_error(kind: OperationKind, deadline: Duration) -> TesseraError {
    let error_kind = match kind {
        OperationKind::Read => ExecutionErrorKind::ReadTimeout,
        OperationKind::Write => ExecutionErrorKind::WriteTimeout,
    };
    TesseraError::execution(
        error_kind,
        format!("operation exceeded deadline of {:?}", deadline),
    )
}
