//! Prepared-statement cache
//!
//! Maps a compiled query's fingerprint to the gateway's prepared handle.
//! Under concurrent access with the same key at most one `prepare` call
//! wins: contemporaries park on the same per-key cell and converge on the
//! winner's handle. Prepare failures propagate to the caller and leave the
//! cell unset, so a later call retries. Capacity is bounded with
//! least-recently-used eviction.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tessera_core::cql::CompiledQuery;
use tessera_core::Result;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::gateway::{DatabaseGateway, PreparedHandle};

type Slot = Arc<OnceCell<PreparedHandle>>;

/// Fingerprint-keyed cache of prepared statement handles
pub struct PreparedStatementCache {
    slots: Mutex<LruCache<String, Slot>>,
}

impl PreparedStatementCache {
    /// Create a cache holding at most `capacity` prepared handles
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get the prepared handle for a compiled query, preparing it through
    /// the gateway on first use
    ///
    /// # Errors
    ///
    /// Propagates the gateway's `Prepare` error; the failure is not cached.
    pub async fn get_or_prepare<G>(
        &self,
        gateway: &G,
        query: &CompiledQuery,
    ) -> Result<PreparedHandle>
    where
        G: DatabaseGateway + ?Sized,
    {
        let slot = {
            let mut slots = self.slots.lock().expect("statement cache lock poisoned");
            slots
                .get_or_insert(query.fingerprint.clone(), Slot::default)
                .clone()
        };

        // Losers of the race park here and receive the winner's handle.
        let handle = slot
            .get_or_try_init(|| async {
                debug!(fingerprint = %query.fingerprint, cql = %query.text, "preparing statement");
                gateway.prepare(&query.text).await
            })
            .await?;

        Ok(handle.clone())
    }

    /// Number of cached entries (prepared or in-flight)
    pub fn len(&self) -> usize {
        self.slots.lock().expect("statement cache lock poisoned").len()
    }

    /// True if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
