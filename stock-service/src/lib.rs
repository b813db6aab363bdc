pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pg_store;
pub mod schema;
pub mod service;
pub mod store;

pub use cache::{MemoryStockCache, StockCache, DEFAULT_CACHE_TTL};
pub use error::{CacheError, StockError};
pub use models::{ReserveOutcome, StockRecord};
pub use service::StockService;
pub use store::{MemoryStockStore, StockStore};
