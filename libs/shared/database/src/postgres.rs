use anyhow::{Context, Result};
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use tracing::debug;

use shared_config::AppConfig;

pub type DbPool = Pool<AsyncPgConnection>;

/// Build the bb8-backed async connection pool every service shares.
pub async fn create_pool(config: &AppConfig) -> Result<DbPool> {
    debug!("Building database pool with max size {}", config.max_pool_size);

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .max_size(config.max_pool_size)
        .build(manager)
        .await
        .context("failed to build database connection pool")?;

    Ok(pool)
}
