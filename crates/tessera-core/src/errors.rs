use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using TesseraError
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Classification of asynchronous execution failures surfaced by the
/// external database gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionErrorKind {
    /// A read did not complete within the store's (or caller's) deadline
    ReadTimeout,
    /// A write did not complete within the store's (or caller's) deadline
    WriteTimeout,
    /// Not enough replicas were alive to satisfy the consistency level
    Unavailable,
    /// Any other gateway-reported failure
    Other,
}

/// The two consumable channels of a result future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultChannel {
    Mapped,
    Raw,
}

impl std::fmt::Display for ResultChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultChannel::Mapped => write!(f, "mapped"),
            ResultChannel::Raw => write!(f, "raw"),
        }
    }
}

/// Comprehensive error taxonomy for Tessera operations
///
/// Compilation-time errors (`Configuration`, `KeysOutOfOrder`,
/// `ColumnNotInPrimaryKey`, `InvalidQuery`) are raised synchronously before
/// any network call. `Prepare` and `Execution` are surfaced from the external
/// gateway; `Execution` is only ever delivered through a result future.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TesseraError {
    /// Missing or invalid schema metadata, raised at DAO construction
    #[error("Invalid table metadata: {message}")]
    Configuration { message: String },

    /// Clause column order does not match the declared primary-key order
    #[error("Keys out of order: got column '{column}', expected '{expected}'")]
    KeysOutOfOrder { column: String, expected: String },

    /// Clause references a column outside the primary key
    #[error("Column is not part of the primary key: {column}")]
    ColumnNotInPrimaryKey { column: String },

    /// The statement cannot be built at all (empty where clause, wrong key count)
    #[error("Not a valid conditional query: {message}")]
    InvalidQuery { message: String },

    /// Statement preparation failed at the external gateway
    #[error("Statement preparation failed: {message}")]
    Prepare { message: String },

    /// Asynchronous execution failed at the external gateway
    #[error("Execution failed ({kind:?}): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        message: String,
    },

    /// A result channel was read a second time after being consumed
    #[error("Result already consumed on the {channel} channel")]
    AlreadyConsumed { channel: ResultChannel },

    /// A row could not be decoded into the model type
    #[error("Row mapping failed: {message}")]
    Mapping { message: String },
}

impl TesseraError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        TesseraError::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid-query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        TesseraError::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a prepare error
    pub fn prepare(message: impl Into<String>) -> Self {
        TesseraError::Prepare {
            message: message.into(),
        }
    }

    /// Create an execution error with the given kind
    pub fn execution(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        TesseraError::Execution {
            kind,
            message: message.into(),
        }
    }

    /// Create a mapping error
    pub fn mapping(message: impl Into<String>) -> Self {
        TesseraError::Mapping {
            message: message.into(),
        }
    }

    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            TesseraError::Configuration { .. } => "ERR_CONFIGURATION",
            TesseraError::KeysOutOfOrder { .. } => "ERR_KEYS_OUT_OF_ORDER",
            TesseraError::ColumnNotInPrimaryKey { .. } => "ERR_COLUMN_NOT_IN_PRIMARY_KEY",
            TesseraError::InvalidQuery { .. } => "ERR_INVALID_QUERY",
            TesseraError::Prepare { .. } => "ERR_PREPARE",
            TesseraError::Execution { .. } => "ERR_EXECUTION",
            TesseraError::AlreadyConsumed { .. } => "ERR_ALREADY_CONSUMED",
            TesseraError::Mapping { .. } => "ERR_MAPPING",
        }
    }
}
