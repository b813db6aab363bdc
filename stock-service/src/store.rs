use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;
use crate::error::StockError;
use crate::models::{ReserveOutcome, StockRecord};

/// Authoritative quantities, one record per tracked product.
///
/// `reserve` must run its read-check-write under an exclusive lock scoped to
/// the one record, so concurrent reservations on a product are serialized
/// while reservations on different products proceed independently. Readers
/// observe either the state before a reservation or after it.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Starts tracking a product with an initial quantity.
    async fn create_record(&self, product_id: Uuid, quantity: i32) -> Result<StockRecord, StockError>;

    async fn get_record(&self, product_id: Uuid) -> Result<StockRecord, StockError>;

    async fn get_quantity(&self, product_id: Uuid) -> Result<i32, StockError> {
        Ok(self.get_record(product_id).await?.quantity)
    }

    /// Takes `amount` out of stock if at least that much is available.
    async fn reserve(&self, product_id: Uuid, amount: i32) -> Result<ReserveOutcome, StockError>;
}

pub(crate) fn ensure_positive_amount(amount: i32) -> Result<(), StockError> {
    if amount <= 0 {
        return Err(StockError::InvalidArgument(format!(
            "reservation amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

pub(crate) fn ensure_initial_quantity(quantity: i32) -> Result<(), StockError> {
    if quantity < 0 {
        return Err(StockError::InvalidArgument(format!(
            "initial quantity must not be negative, got {}",
            quantity
        )));
    }
    Ok(())
}

/// Process-local store. Each record sits behind its own `RwLock`, which acts
/// as the row lock: reservations take it exclusively, lookups share it.
#[derive(Default)]
pub struct MemoryStockStore {
    rows: DashMap<Uuid, Arc<RwLock<StockRecord>>>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, product_id: Uuid) -> Result<Arc<RwLock<StockRecord>>, StockError> {
        // Clone the Arc out so no map shard stays locked across an await.
        self.rows
            .get(&product_id)
            .map(|row| Arc::clone(row.value()))
            .ok_or(StockError::NotFound(product_id))
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn create_record(&self, product_id: Uuid, quantity: i32) -> Result<StockRecord, StockError> {
        ensure_initial_quantity(quantity)?;
        match self.rows.entry(product_id) {
            Entry::Occupied(_) => Err(StockError::AlreadyTracked(product_id)),
            Entry::Vacant(slot) => {
                let record = StockRecord::new(product_id, quantity);
                slot.insert(Arc::new(RwLock::new(record.clone())));
                Ok(record)
            }
        }
    }

    async fn get_record(&self, product_id: Uuid) -> Result<StockRecord, StockError> {
        let row = self.row(product_id)?;
        let record = row.read().await;
        Ok(record.clone())
    }

    async fn reserve(&self, product_id: Uuid, amount: i32) -> Result<ReserveOutcome, StockError> {
        ensure_positive_amount(amount)?;
        let row = self.row(product_id)?;
        let mut record = row.write().await;

        match record.decremented(amount) {
            Some(next) => {
                *record = next.clone();
                debug!("Reserved {} of product {}, {} left (version {})", amount, product_id, next.quantity, next.version);
                Ok(ReserveOutcome::Reserved(next))
            }
            None => Ok(ReserveOutcome::Insufficient { available: record.quantity }),
        }
    }
}
