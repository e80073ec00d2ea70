pub mod models;
pub mod schema;
pub mod services;
pub mod store;

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending schema migrations over a blocking connection. Run once at
/// startup, before the async pool is built.
pub fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    let mut conn = PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("migration error: {}", e))?;

    if !applied.is_empty() {
        info!("Applied {} pending migrations", applied.len());
    }

    Ok(())
}

// Re-export models and services for external use
pub use models::*;
pub use services::{BookingService, QueryService};
