use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

/// Connection pool for the Postgres seat store.
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    /// Connects eagerly; an unreachable server is an error here.
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        info!("Connected to seat database (pool size {})", pool_size);

        Ok(Database { pool })
    }

    /// Creates the `seats` table if it is missing.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Seat schema is up to date");
        Ok(())
    }
}
