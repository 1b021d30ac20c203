use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

const POOL_MAX_CONNECTIONS: u32 = 20;
const CONNECT_ATTEMPTS: u32 = 6;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Builds the connection pool, retrying with doubling backoff while the
/// database comes up alongside the service.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;

    loop {
        match PgPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!("Database pool ready");
                return Ok(pool);
            }
            Err(e) if attempt >= CONNECT_ATTEMPTS => return Err(e),
            Err(e) => {
                warn!(
                    attempt,
                    max = CONNECT_ATTEMPTS,
                    "Database not reachable ({}), retrying in {:?}",
                    e,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
        }
    }
}
