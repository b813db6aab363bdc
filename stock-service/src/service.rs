use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::cache::{StockCache, DEFAULT_CACHE_TTL};
use crate::error::StockError;
use crate::models::{ReserveOutcome, StockRecord};
use crate::store::StockStore;

/// Coordinates the store and the cache for the two caller-facing operations.
///
/// Cache failures are logged and otherwise ignored. Store failures propagate.
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn StockStore>,
    cache: Arc<dyn StockCache>,
    cache_ttl: Duration,
}

impl StockService {
    pub fn new(store: Arc<dyn StockStore>, cache: Arc<dyn StockCache>) -> Self {
        Self {
            store,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Current quantity for a product, `0` when the product has no stock record.
    pub async fn get_product_stock(&self, product_id: Uuid) -> Result<i32, StockError> {
        match self.cache.get(product_id).await {
            Ok(Some(quantity)) => return Ok(quantity),
            Ok(None) => {}
            Err(e) => warn!("Stock cache read failed for product {}, falling back to store: {}", product_id, e),
        }

        let record = match self.store.get_record(product_id).await {
            Ok(record) => record,
            Err(StockError::NotFound(_)) => {
                debug!("No stock record for product {}, reporting zero", product_id);
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self
            .cache
            .set(product_id, record.quantity, record.version, self.cache_ttl)
            .await
        {
            warn!("Failed to cache stock for product {}: {}", product_id, e);
        }

        Ok(record.quantity)
    }

    /// Reserves `quantity` units. `Ok(false)` means there was not enough stock
    /// or the product is not tracked.
    pub async fn reserve_product(&self, product_id: Uuid, quantity: i32) -> Result<bool, StockError> {
        let outcome = match self.store.reserve(product_id, quantity).await {
            Ok(outcome) => outcome,
            Err(StockError::NotFound(_)) => {
                info!("Reservation for untracked product {} refused", product_id);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        match outcome {
            ReserveOutcome::Reserved(record) => {
                self.write_through(&record).await;
                info!("Reserved {} of product {}, {} left", quantity, product_id, record.quantity);
                Ok(true)
            }
            ReserveOutcome::Insufficient { available } => {
                info!("Insufficient stock for product {}: requested {}, available {}", product_id, quantity, available);
                Ok(false)
            }
        }
    }

    /// Starts tracking stock for a catalog product and primes the cache.
    ///
    /// Entry point for the catalog side when a product enters inventory
    /// tracking; the stock HTTP surface never creates records itself.
    pub async fn track_product(&self, product_id: Uuid, quantity: i32) -> Result<StockRecord, StockError> {
        let record = self.store.create_record(product_id, quantity).await?;
        self.write_through(&record).await;
        Ok(record)
    }

    async fn write_through(&self, record: &StockRecord) {
        let product_id = record.product_id;
        if let Err(e) = self
            .cache
            .set(product_id, record.quantity, record.version, self.cache_ttl)
            .await
        {
            warn!("Failed to refresh cached stock for product {}: {}", product_id, e);
            // A stale entry must not outlive the mutation.
            if let Err(e) = self.cache.invalidate(product_id).await {
                warn!("Failed to invalidate cached stock for product {}: {}", product_id, e);
            }
        }
    }
}
