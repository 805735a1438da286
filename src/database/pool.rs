use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::get_config;
use crate::error::Result;

/// Pool for the configured database. Acquiring waits at most as long as an
/// import may wait to begin its transaction.
pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.import_tx_max_wait_secs))
        .connect(&config.database_url)
        .await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Connected to database"
    );
    Ok(pool)
}
