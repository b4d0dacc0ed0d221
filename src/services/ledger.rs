//! Seat ledger: the only component allowed to change seat state.
//!
//! A seat is either `Free` or `Occupied`. `assign` moves a free seat to occupied and
//! `release` moves it back; there is no in-place edit of a lease. Payload validation
//! runs before any store access, and the store's conditional commit decides the
//! winner when two callers race on the same seat.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::StorageBackend;
use crate::error::{LedgerError, LedgerResult, StoreError};
use crate::models::{AssignDetails, AssignRequest, Occupant, Seat, SeatState};
use crate::store::{CommitOutcome, SeatStore};

/// Read model served to every client: the whole collection, ordered by seat number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshot {
    pub seats: Vec<Seat>,
    pub updated_at: DateTime<Utc>,
}

impl SeatSnapshot {
    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| !s.is_free()).count()
    }
}

pub struct SeatLedger {
    store: Arc<dyn SeatStore>,
    total_seats: u32,
}

impl SeatLedger {
    pub fn new(store: Arc<dyn SeatStore>, total_seats: u32) -> Self {
        Self { store, total_seats }
    }

    pub fn backend(&self) -> StorageBackend {
        self.store.backend()
    }

    /// Validates `request` and assigns the seat it names.
    pub async fn assign(&self, request: AssignRequest) -> LedgerResult<Seat> {
        let details = request.into_details()?;
        self.assign_details(details).await
    }

    #[tracing::instrument(skip(self, details), fields(seat = details.seat_number))]
    pub async fn assign_details(&self, details: AssignDetails) -> LedgerResult<Seat> {
        let number = self.seat_in_range(details.seat_number)?;
        let current = self.find(number).await?;
        if let Some(occupant) = current.occupant_name() {
            warn!("Seat {} is already assigned to {}", number, occupant);
            return Err(LedgerError::SeatAlreadyOccupied {
                seat: number,
                occupant: occupant.to_string(),
            });
        }

        let seat = Seat::occupied(
            number,
            Occupant {
                student_name: details.student_name,
                phone_number: details.phone_number,
                gender: details.gender,
                plan: details.plan,
                start_date: details.start_date,
                end_date: details.end_date,
                amount: details.amount,
                assigned_at: assignment_time(),
                receipt_id: details.receipt_id,
            },
        );

        match self.commit(&seat, SeatState::Free).await? {
            CommitOutcome::Committed => {
                info!("Seat {} assigned to {}", number, seat.occupant_name().unwrap_or_default());
                Ok(seat)
            }
            CommitOutcome::Conflict => {
                // another writer got there between our read and our commit
                let winner = self.store.find_by_number(number).await.map_err(|e| store_failure("assign", e))?;
                let occupant = winner
                    .as_ref()
                    .and_then(|s| s.occupant_name())
                    .unwrap_or("a concurrent assignment")
                    .to_string();
                warn!("Lost the race for seat {} to {}", number, occupant);
                match winner {
                    None => Err(LedgerError::SeatNotFound(i64::from(number))),
                    Some(_) => Err(LedgerError::SeatAlreadyOccupied { seat: number, occupant }),
                }
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn release(&self, seat_number: i64) -> LedgerResult<Seat> {
        let number = self.seat_in_range(seat_number)?;
        let current = self.find(number).await?;
        if current.is_free() {
            warn!("Seat {} is already free", number);
            return Err(LedgerError::SeatAlreadyFree(number));
        }

        let seat = Seat::free(number);
        match self.commit(&seat, SeatState::Occupied).await? {
            CommitOutcome::Committed => {
                info!(
                    "Seat {} released (was {})",
                    number,
                    current.occupant_name().unwrap_or_default()
                );
                Ok(seat)
            }
            CommitOutcome::Conflict => {
                let now = self.store.find_by_number(number).await.map_err(|e| store_failure("release", e))?;
                warn!("Seat {} was released concurrently", number);
                match now {
                    None => Err(LedgerError::SeatNotFound(i64::from(number))),
                    Some(_) => Err(LedgerError::SeatAlreadyFree(number)),
                }
            }
        }
    }

    /// Current state of every seat, stamped with the time the snapshot was taken.
    pub async fn list(&self) -> LedgerResult<SeatSnapshot> {
        let mut seats = self.store.load().await.map_err(|e| store_failure("list", e))?;
        seats.sort_by_key(|s| s.number);
        Ok(SeatSnapshot {
            seats,
            updated_at: Utc::now(),
        })
    }

    /// Current state of one seat.
    pub async fn seat(&self, seat_number: i64) -> LedgerResult<Seat> {
        let number = self.seat_in_range(seat_number)?;
        self.find(number).await
    }

    pub fn seat_in_range(&self, seat_number: i64) -> LedgerResult<u32> {
        u32::try_from(seat_number)
            .ok()
            .filter(|n| (1..=self.total_seats).contains(n))
            .ok_or(LedgerError::SeatNotFound(seat_number))
    }

    async fn find(&self, number: u32) -> LedgerResult<Seat> {
        self.store
            .find_by_number(number)
            .await
            .map_err(|e| store_failure("find", e))?
            .ok_or(LedgerError::SeatNotFound(i64::from(number)))
    }

    async fn commit(&self, seat: &Seat, expected: SeatState) -> LedgerResult<CommitOutcome> {
        self.store
            .commit(seat, expected)
            .await
            .map_err(|e| store_failure("commit", e))
    }
}

/// Millisecond precision, which every backend stores exactly.
fn assignment_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn store_failure(op: &str, err: StoreError) -> LedgerError {
    error!("Seat store {} failed: {}", op, err);
    LedgerError::StoreUnavailable(err)
}
