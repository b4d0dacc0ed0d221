use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CommitOutcome, SeatStore};
use crate::config::StorageBackend;
use crate::error::StoreResult;
use crate::models::{Seat, SeatState};

/// Volatile seat store. State lives only as long as this value, so separate
/// processes (or replicas) each see their own seats.
#[derive(Debug, Default)]
pub struct MemorySeatStore {
    seats: RwLock<Vec<Seat>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn initialize(&self, total_seats: u32) -> StoreResult<()> {
        let mut seats = self.seats.write().await;
        if seats.is_empty() {
            *seats = (1..=total_seats).map(Seat::free).collect();
        }
        Ok(())
    }

    async fn load(&self) -> StoreResult<Vec<Seat>> {
        Ok(self.seats.read().await.clone())
    }

    async fn find_by_number(&self, number: u32) -> StoreResult<Option<Seat>> {
        let seats = self.seats.read().await;
        Ok(seats.iter().find(|s| s.number == number).cloned())
    }

    async fn commit(&self, seat: &Seat, expected: SeatState) -> StoreResult<CommitOutcome> {
        // the write guard is the single-writer section for check-and-set
        let mut seats = self.seats.write().await;
        match seats.iter_mut().find(|s| s.number == seat.number) {
            Some(current) if current.state() == expected => {
                *current = seat.clone();
                Ok(CommitOutcome::Committed)
            }
            _ => Ok(CommitOutcome::Conflict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let store = MemorySeatStore::new();
        store.initialize(3).await.unwrap();
        store.initialize(10).await.unwrap();
        let seats = store.load().await.unwrap();
        assert_eq!(seats.iter().map(|s| s.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(seats.iter().all(Seat::is_free));
    }

    #[tokio::test]
    async fn find_by_number_returns_none_for_unknown_seats() {
        let store = MemorySeatStore::new();
        store.initialize(2).await.unwrap();
        assert!(store.find_by_number(2).await.unwrap().is_some());
        assert!(store.find_by_number(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_against_stale_state_is_a_conflict() {
        let store = MemorySeatStore::new();
        store.initialize(2).await.unwrap();
        let outcome = store.commit(&Seat::free(1), SeatState::Occupied).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict);
        let outcome = store.commit(&Seat::free(9), SeatState::Free).await.unwrap();
        assert_eq!(outcome, CommitOutcome::Conflict);
    }
}
