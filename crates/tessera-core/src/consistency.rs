//! Consistency-level resolution
//!
//! Per-operation consistency resolves through a layered scope: the
//! request-scoped override wins, then the process-wide default, then the
//! external gateway's own default (expressed here as `None`). The override
//! is a plain value threaded through the call chain inside the call
//! context, never shared mutable state, so concurrent requests cannot
//! observe each other's overrides.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TesseraError};

/// Header-style input naming the read consistency override
pub const READ_CONSISTENCY_HEADER: &str = "x-read-consistency";
/// Header-style input naming the write consistency override
pub const WRITE_CONSISTENCY_HEADER: &str = "x-write-consistency";

/// How many replicas must acknowledge an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
    Serial,
    LocalSerial,
}

impl ConsistencyLevel {
    /// Canonical wire name of this level
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::LocalOne => "LOCAL_ONE",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
        }
    }
}

impl std::fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Ok(ConsistencyLevel::Any),
            "ONE" => Ok(ConsistencyLevel::One),
            "TWO" => Ok(ConsistencyLevel::Two),
            "THREE" => Ok(ConsistencyLevel::Three),
            "QUORUM" => Ok(ConsistencyLevel::Quorum),
            "ALL" => Ok(ConsistencyLevel::All),
            "LOCAL_QUORUM" => Ok(ConsistencyLevel::LocalQuorum),
            "EACH_QUORUM" => Ok(ConsistencyLevel::EachQuorum),
            "LOCAL_ONE" => Ok(ConsistencyLevel::LocalOne),
            "SERIAL" => Ok(ConsistencyLevel::Serial),
            "LOCAL_SERIAL" => Ok(ConsistencyLevel::LocalSerial),
            other => Err(TesseraError::configuration(format!(
                "unknown consistency level '{}'",
                other
            ))),
        }
    }
}

/// Whether an operation reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Read,
    Write,
}

/// Process-wide default levels, held by the DAO
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyDefaults {
    pub read: Option<ConsistencyLevel>,
    pub write: Option<ConsistencyLevel>,
}

impl ConsistencyDefaults {
    /// Resolve the level for one operation: override, then default, then
    /// `None` (the gateway applies its own default)
    pub fn resolve(
        &self,
        kind: OperationKind,
        request_override: &ConsistencyOverride,
    ) -> Option<ConsistencyLevel> {
        match kind {
            OperationKind::Read => request_override.read.or(self.read),
            OperationKind::Write => request_override.write.or(self.write),
        }
    }
}

/// Request-scoped override, installed at the request boundary and carried
/// through the call chain by value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyOverride {
    pub read: Option<ConsistencyLevel>,
    pub write: Option<ConsistencyLevel>,
}

impl ConsistencyOverride {
    /// No override: defaults apply
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse the two named request-boundary inputs
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when a supplied level name is unknown.
    pub fn from_headers(read: Option<&str>, write: Option<&str>) -> Result<Self> {
        Ok(Self {
            read: read.map(ConsistencyLevel::from_str).transpose()?,
            write: write.map(ConsistencyLevel::from_str).transpose()?,
        })
    }
}
