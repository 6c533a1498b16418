//! One-shot, dual-channel consumable async result
//!
//! A `ResultFuture` is handed back by the execution gateway before the
//! operation completes. It carries two channels populated atomically from
//! one completion event: the mapped-value channel and the raw-row-set
//! channel. Each channel delivers exactly one terminal item; reading a
//! channel a second time fails with `AlreadyConsumed`. If the completion
//! carried an error, both channels deliver that error instead of a value.

use tessera_core::{
    ExecutionErrorKind, Result, ResultChannel, RowSet, TesseraError,
};
use tokio::sync::oneshot;

/// Mapped-value outcome of an executed read
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped<T> {
    /// The row set was empty (an explicit absent value, not an error)
    Absent,
    /// Exactly one row, decoded, and list semantics were not requested
    One(T),
    /// Decoded rows in store order
    Many(Vec<T>),
}

impl<T> Mapped<T> {
    /// The single value, if this outcome is `One`
    pub fn into_one(self) -> Option<T> {
        match self {
            Mapped::One(value) => Some(value),
            _ => None,
        }
    }

    /// All values as a vector (`Absent` becomes empty, `One` a singleton)
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Mapped::Absent => Vec::new(),
            Mapped::One(value) => vec![value],
            Mapped::Many(values) => values,
        }
    }

    /// True if the row set was empty
    pub fn is_absent(&self) -> bool {
        matches!(self, Mapped::Absent)
    }
}

/// Completion side of a result future, held by the execution gateway
///
/// Consuming it (`fulfill` or `fail`) populates both channels from the one
/// underlying completion event; dropping it without completing delivers a
/// synthetic execution error to any waiter.
pub(crate) struct Completion<T> {
    mapped: oneshot::Sender<Result<Mapped<T>>>,
    raw: oneshot::Sender<Result<RowSet>>,
}

impl<T> Completion<T> {
    /// Deliver a successful outcome on both channels
    pub(crate) fn fulfill(self, mapped: Mapped<T>, rows: RowSet) {
        let _ = self.mapped.send(Ok(mapped));
        let _ = self.raw.send(Ok(rows));
    }

    /// Deliver an error outcome on both channels
    pub(crate) fn fail(self, error: TesseraError) {
        let _ = self.mapped.send(Err(error.clone()));
        let _ = self.raw.send(Err(error));
    }
}

/// Consumable async result of one submitted operation
#[derive(Debug)]
pub struct ResultFuture<T> {
    mapped: Option<oneshot::Receiver<Result<Mapped<T>>>>,
    raw: Option<oneshot::Receiver<Result<RowSet>>>,
}

impl<T> ResultFuture<T> {
    /// Create a pending future and its completion side
    pub(crate) fn channel() -> (Self, Completion<T>) {
        let (mapped_tx, mapped_rx) = oneshot::channel();
        let (raw_tx, raw_rx) = oneshot::channel();
        (
            Self {
                mapped: Some(mapped_rx),
                raw: Some(raw_rx),
            },
            Completion {
                mapped: mapped_tx,
                raw: raw_tx,
            },
        )
    }

    /// Await the mapped value
    ///
    /// Suspends until the completion event has occurred, then delivers the
    /// mapped outcome exactly once.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyConsumed` on a second call, the completion's
    /// `Execution` error if the operation failed, or a `Mapping` error if
    /// row decoding failed.
    pub async fn mapped(&mut self) -> Result<Mapped<T>> {
        let receiver = self.mapped.take().ok_or(TesseraError::AlreadyConsumed {
            channel: ResultChannel::Mapped,
        })?;
        receiver.await.unwrap_or_else(|_| Err(dropped_completion()))
    }

    /// Await the raw row set
    ///
    /// Same consumption rules as [`ResultFuture::mapped`]; the two channels
    /// consume independently.
    pub async fn row_set(&mut self) -> Result<RowSet> {
        let receiver = self.raw.take().ok_or(TesseraError::AlreadyConsumed {
            channel: ResultChannel::Raw,
        })?;
        receiver.await.unwrap_or_else(|_| Err(dropped_completion()))
    }
}

fn dropped_completion() -> TesseraError {
    TesseraError::execution(
        ExecutionErrorKind::Other,
        "execution task dropped before completing",
    )
}
