use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::stock_records)]
#[diesel(primary_key(product_id))]
pub struct StockRecord {
    pub product_id: Uuid,
    pub quantity: i32,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        let now = Utc::now();
        Self {
            product_id,
            quantity,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the record after taking `amount` out of stock, or `None` when
    /// there is not enough left.
    pub fn decremented(&self, amount: i32) -> Option<Self> {
        if self.quantity < amount {
            return None;
        }
        Some(Self {
            quantity: self.quantity - amount,
            version: self.version + 1,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::stock_records)]
pub struct NewStockRecord {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    Reserved(StockRecord),
    Insufficient { available: i32 },
}

impl ReserveOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, ReserveOutcome::Reserved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_bumps_version_once() {
        let record = StockRecord::new(Uuid::new_v4(), 10);
        let next = record.decremented(4).unwrap();
        assert_eq!(next.quantity, 6);
        assert_eq!(next.version, 1);
        assert_eq!(next.created_at, record.created_at);
    }

    #[test]
    fn decrement_to_zero_is_allowed() {
        let record = StockRecord::new(Uuid::new_v4(), 3);
        assert_eq!(record.decremented(3).unwrap().quantity, 0);
    }

    #[test]
    fn decrement_past_zero_is_refused() {
        let record = StockRecord::new(Uuid::new_v4(), 3);
        assert!(record.decremented(4).is_none());
    }
}
