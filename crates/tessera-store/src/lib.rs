//! Tessera store - async execution half of the data-access layer
//!
//! Provides:
//! - The database-gateway trait the external store is reached through
//! - A bounded prepared-statement cache with single-compile-per-shape
//!   semantics
//! - The execution gateway wiring async completions onto result futures
//! - One-shot dual-channel result futures
//! - The typed DAO composing all of the above over one table

pub mod dao;
mod executor;
pub mod gateway;
pub mod result_future;
pub mod statement_cache;

// Re-export key types
pub use dao::{CallContext, Dao, DaoConfig};
pub use gateway::{BoundStatement, DatabaseGateway, PreparedHandle};
pub use result_future::{Mapped, ResultFuture};
pub use statement_cache::PreparedStatementCache;
