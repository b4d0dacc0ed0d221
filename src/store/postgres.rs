use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::info;

use super::{CommitOutcome, SeatStore};
use crate::config::StorageBackend;
use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{Seat, SeatRecord, SeatState};

const SELECT_SEATS: &str = "SELECT number, student_name, phone_number, gender, plan, \
     start_date, end_date, amount, assigned_at, receipt_id FROM seats";

/// Seat store with one row per seat.
///
/// Transitions are a single conditional `UPDATE` matched on the expected state, so
/// at most one of several concurrent writers (from any number of processes) wins.
#[derive(Clone)]
pub struct PgSeatStore {
    db: Database,
}

#[derive(Debug, FromRow)]
struct SeatRow {
    number: i32,
    student_name: Option<String>,
    phone_number: Option<String>,
    gender: Option<String>,
    plan: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    amount: Option<f64>,
    assigned_at: Option<DateTime<Utc>>,
    receipt_id: Option<String>,
}

impl TryFrom<SeatRow> for Seat {
    type Error = StoreError;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        let number = u32::try_from(row.number)
            .map_err(|_| StoreError::Malformed(format!("invalid seat number {}", row.number)))?;
        Seat::try_from(SeatRecord {
            number,
            student_name: row.student_name,
            phone_number: row.phone_number,
            gender: row.gender,
            plan: row.plan,
            start_date: row.start_date,
            end_date: row.end_date,
            amount: row.amount,
            assigned_at: row.assigned_at,
            receipt_id: row.receipt_id,
        })
        .map_err(StoreError::Malformed)
    }
}

impl PgSeatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }

    async fn initialize(&self, total_seats: u32) -> StoreResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats")
            .fetch_one(&self.db.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        // replicas racing on first boot all insert the same rows
        let inserted = sqlx::query(
            "INSERT INTO seats (number)
             SELECT generate_series(1, $1)
             ON CONFLICT (number) DO NOTHING",
        )
        .bind(total_seats as i32)
        .execute(&self.db.pool)
        .await?
        .rows_affected();
        info!("Initialized {} seats", inserted);
        Ok(())
    }

    async fn load(&self) -> StoreResult<Vec<Seat>> {
        let rows: Vec<SeatRow> = sqlx::query_as(&format!("{} ORDER BY number", SELECT_SEATS))
            .fetch_all(&self.db.pool)
            .await?;
        rows.into_iter().map(Seat::try_from).collect()
    }

    async fn find_by_number(&self, number: u32) -> StoreResult<Option<Seat>> {
        let Ok(number) = i32::try_from(number) else {
            return Ok(None);
        };
        let row: Option<SeatRow> = sqlx::query_as(&format!("{} WHERE number = $1", SELECT_SEATS))
            .bind(number)
            .fetch_optional(&self.db.pool)
            .await?;
        row.map(Seat::try_from).transpose()
    }

    async fn commit(&self, seat: &Seat, expected: SeatState) -> StoreResult<CommitOutcome> {
        let Ok(number) = i32::try_from(seat.number) else {
            return Ok(CommitOutcome::Conflict);
        };
        let guard = match expected {
            SeatState::Free => "student_name IS NULL",
            SeatState::Occupied => "student_name IS NOT NULL",
        };
        let record = SeatRecord::from(seat.clone());

        let affected = sqlx::query(&format!(
            "UPDATE seats
             SET student_name = $2, phone_number = $3, gender = $4, plan = $5,
                 start_date = $6, end_date = $7, amount = $8, assigned_at = $9,
                 receipt_id = $10, updated_at = NOW()
             WHERE number = $1 AND {}",
            guard
        ))
        .bind(number)
        .bind(record.student_name)
        .bind(record.phone_number)
        .bind(record.gender)
        .bind(record.plan)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.amount)
        .bind(record.assigned_at)
        .bind(record.receipt_id)
        .execute(&self.db.pool)
        .await?
        .rows_affected();

        if affected > 0 {
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::Conflict)
        }
    }
}
