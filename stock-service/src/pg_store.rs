use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::info;
use uuid::Uuid;
use crate::error::StockError;
use crate::models::*;
use crate::schema::*;
use crate::store::{ensure_initial_quantity, ensure_positive_amount, StockStore};

pub type DbPool = Pool<AsyncPgConnection>;

/// Postgres-backed store. Reservations lock the row with `SELECT ... FOR UPDATE`
/// inside a transaction, so the lock is released on commit or rollback.
#[derive(Clone)]
pub struct PgStockStore {
    pool: DbPool,
}

impl PgStockStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn create_record(&self, product_id: Uuid, quantity: i32) -> Result<StockRecord, StockError> {
        ensure_initial_quantity(quantity)?;
        let mut conn = self.pool.get().await?;

        let new_record = NewStockRecord { product_id, quantity };
        let inserted = diesel::insert_into(stock_records::table)
            .values(&new_record)
            .returning(StockRecord::as_returning())
            .get_result::<StockRecord>(&mut conn)
            .await;

        match inserted {
            Ok(record) => {
                info!("Started tracking stock for product {} with quantity {}", product_id, quantity);
                Ok(record)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(StockError::AlreadyTracked(product_id))
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Err(StockError::NotFound(product_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_record(&self, product_id: Uuid) -> Result<StockRecord, StockError> {
        let mut conn = self.pool.get().await?;

        stock_records::table
            .filter(stock_records::product_id.eq(product_id))
            .select(StockRecord::as_select())
            .first::<StockRecord>(&mut conn)
            .await
            .optional()?
            .ok_or(StockError::NotFound(product_id))
    }

    async fn get_quantity(&self, product_id: Uuid) -> Result<i32, StockError> {
        let mut conn = self.pool.get().await?;

        stock_records::table
            .filter(stock_records::product_id.eq(product_id))
            .select(stock_records::quantity)
            .first::<i32>(&mut conn)
            .await
            .optional()?
            .ok_or(StockError::NotFound(product_id))
    }

    async fn reserve(&self, product_id: Uuid, amount: i32) -> Result<ReserveOutcome, StockError> {
        ensure_positive_amount(amount)?;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, StockError, _>(|conn| {
            async move {
                let record = stock_records::table
                    .filter(stock_records::product_id.eq(product_id))
                    .select(StockRecord::as_select())
                    .for_update()
                    .first::<StockRecord>(conn)
                    .await
                    .optional()?
                    .ok_or(StockError::NotFound(product_id))?;

                if record.quantity < amount {
                    return Ok(ReserveOutcome::Insufficient { available: record.quantity });
                }

                let updated = diesel::update(stock_records::table.filter(stock_records::product_id.eq(product_id)))
                    .set((
                        stock_records::quantity.eq(stock_records::quantity - amount),
                        stock_records::version.eq(stock_records::version + 1),
                        stock_records::updated_at.eq(Utc::now()),
                    ))
                    .returning(StockRecord::as_returning())
                    .get_result::<StockRecord>(conn)
                    .await?;

                Ok(ReserveOutcome::Reserved(updated))
            }
            .scope_boxed()
        })
        .await
    }
}
