use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use diesel::PgConnection;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

use anyhow::Result;
use clap::Parser;
use diesel::Connection;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};
use std::sync::Arc;
use tokio::time;
use tracing::info;
use stock_service::api;
use stock_service::config::Args;
use stock_service::pg_store::PgStockStore;
use stock_service::{MemoryStockCache, StockService};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    // Run migrations first
    info!("Running database migrations...");
    let mut conn = PgConnection::establish(&args.database_url)?;
    conn.run_pending_migrations(MIGRATIONS).map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
    info!("Migrations completed successfully");

    let config = diesel_async::pooled_connection::AsyncDieselConnectionManager::<AsyncPgConnection>::new(&args.database_url);
    let pool = Pool::builder().max_size(args.db_pool_size).build(config).await?;

    let store = Arc::new(PgStockStore::new(pool));
    let cache = Arc::new(MemoryStockCache::new());
    let service = StockService::new(store, cache.clone()).with_ttl(args.cache_ttl());

    let sweeper_cache = cache.clone();
    let sweep_interval = args.cache_sweep_interval();
    tokio::spawn(async move {
        let mut interval = time::interval(sweep_interval);
        loop {
            interval.tick().await;
            sweeper_cache.purge_expired();
        }
    });

    let app = api::create_router(api::AppState { service });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Stock service started on port {} (cache ttl {}s)", args.port, args.cache_ttl_secs);

    axum::serve(listener, app).await?;

    Ok(())
}
