//! Persistence adapters for the fixed seat collection.
//!
//! Every backend honours the same contract:
//! - `load` returns all seats in ascending number order.
//! - `initialize` is idempotent and only creates seats when the store is empty.
//! - `commit` replaces the whole state of one seat, and only if the stored seat is
//!   still in the state the caller observed. A mismatch is reported as
//!   [`CommitOutcome::Conflict`] and leaves the store untouched.
//! - a `commit` followed by a `load` in the same process observes the committed seat.
//!
//! Only [`FileSeatStore`] and [`PgSeatStore`] are consistent across processes.

pub mod file;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{Seat, SeatState};

pub use file::FileSeatStore;
pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The stored seat was missing or no longer in the expected state.
    Conflict,
}

#[async_trait]
pub trait SeatStore: Send + Sync {
    fn backend(&self) -> StorageBackend;

    async fn initialize(&self, total_seats: u32) -> StoreResult<()>;

    async fn load(&self) -> StoreResult<Vec<Seat>>;

    async fn find_by_number(&self, number: u32) -> StoreResult<Option<Seat>>;

    async fn commit(&self, seat: &Seat, expected: SeatState) -> StoreResult<CommitOutcome>;
}

/// Builds the configured store and seeds it with `total_seats` free seats.
///
/// When the backend cannot be reached and `fallback_to_memory` is set, the process
/// degrades to a [`MemorySeatStore`] instead of failing.
pub async fn build_store(
    config: &StorageConfig,
    total_seats: u32,
) -> StoreResult<Arc<dyn SeatStore>> {
    match open_backend(config, total_seats).await {
        Ok(store) => Ok(store),
        Err(e) if config.fallback_to_memory && config.backend != StorageBackend::Memory => {
            error!("{} seat store unavailable: {}", config.backend, e);
            warn!("Falling back to volatile in-memory seats; assignments will not survive a restart");
            let store = MemorySeatStore::new();
            store.initialize(total_seats).await?;
            Ok(Arc::new(store))
        }
        Err(e) => Err(e),
    }
}

async fn open_backend(config: &StorageConfig, total_seats: u32) -> StoreResult<Arc<dyn SeatStore>> {
    let store: Arc<dyn SeatStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemorySeatStore::new()),
        StorageBackend::File => Arc::new(FileSeatStore::new(&config.seats_file)),
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                StoreError::Unavailable("DATABASE_URL is not configured".to_string())
            })?;
            let db = Database::new(url, config.pool_size).await?;
            db.run_migrations().await?;
            Arc::new(PgSeatStore::new(db))
        }
    };
    store.initialize(total_seats).await?;
    info!("Using {} seat storage", store.backend());
    Ok(store)
}
