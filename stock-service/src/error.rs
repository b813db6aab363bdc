use diesel_async::pooled_connection::PoolError;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the stock store and the facade built on it.
///
/// Running out of stock is not an error; see [`crate::models::ReserveOutcome`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("No stock record for product {0}")]
    NotFound(Uuid),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Product {0} is already tracked")]
    AlreadyTracked(Uuid),

    #[error("Stock store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<diesel::result::Error> for StockError {
    fn from(e: diesel::result::Error) -> Self {
        StockError::StoreUnavailable(e.to_string())
    }
}

impl From<bb8::RunError<PoolError>> for StockError {
    fn from(e: bb8::RunError<PoolError>) -> Self {
        StockError::StoreUnavailable(e.to_string())
    }
}

/// Cache failures. These never leave the facade: a failing cache is a miss.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    #[error("Stock cache unavailable: {0}")]
    Unavailable(String),
}
