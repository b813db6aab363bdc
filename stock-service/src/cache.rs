//! Read-through cache of stock quantities.
//!
//! The cache is a derived mirror of the store. It holds no truth of its own,
//! so any entry may be dropped at any time. Entries carry the record version
//! they were read at, and an entry is never replaced by an older version.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;
use crate::error::CacheError;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait StockCache: Send + Sync {
    /// Cached quantity, or `None` when absent or expired.
    async fn get(&self, product_id: Uuid) -> Result<Option<i32>, CacheError>;

    /// Stores `quantity` as read at record `version` and restarts its TTL,
    /// unless the entry already holds a newer version. A lookup that read the
    /// store before a reservation committed can then never overwrite the
    /// reservation's write-through.
    async fn set(&self, product_id: Uuid, quantity: i32, version: i32, ttl: Duration) -> Result<(), CacheError>;

    async fn invalidate(&self, product_id: Uuid) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Copy)]
struct CachedQuantity {
    quantity: i32,
    version: i32,
    expires_at: Instant,
}

/// In-process TTL cache.
#[derive(Default)]
pub struct MemoryStockCache {
    entries: DashMap<Uuid, CachedQuantity>,
}

impl MemoryStockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Purged {} expired stock cache entries", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StockCache for MemoryStockCache {
    async fn get(&self, product_id: Uuid) -> Result<Option<i32>, CacheError> {
        let hit = self
            .entries
            .get(&product_id)
            .map(|entry| *entry.value());

        match hit {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.quantity)),
            Some(_) => {
                self.entries
                    .remove_if(&product_id, |_, entry| entry.expires_at <= Instant::now());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, product_id: Uuid, quantity: i32, version: i32, ttl: Duration) -> Result<(), CacheError> {
        let fresh = CachedQuantity {
            quantity,
            version,
            expires_at: Instant::now() + ttl,
        };

        match self.entries.entry(product_id) {
            Entry::Occupied(mut slot) => {
                if slot.get().version > version {
                    debug!(
                        "Skipped stale fill for product {}: cached version {}, offered {}",
                        product_id,
                        slot.get().version,
                        version
                    );
                    return Ok(());
                }
                slot.insert(fresh);
            }
            Entry::Vacant(slot) => {
                slot.insert(fresh);
            }
        }
        Ok(())
    }

    async fn invalidate(&self, product_id: Uuid) -> Result<(), CacheError> {
        self.entries.remove(&product_id);
        Ok(())
    }
}
