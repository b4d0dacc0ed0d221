use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::ledger::SeatSnapshot;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringLease {
    pub number: u32,
    pub student_name: String,
    pub end_date: String,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_seats: usize,
    pub occupied: usize,
    pub free: usize,
    pub expiring_soon: Vec<ExpiringLease>,
    pub updated_at: DateTime<Utc>,
}

/// Summarizes a snapshot for the admin view. Leases ending within `window_days`
/// of `today` (overdue ones included, at zero days) are listed, soonest first.
pub fn summarize(snapshot: &SeatSnapshot, today: NaiveDate, window_days: i64) -> DashboardSummary {
    let occupied = snapshot.occupied_count();

    let mut expiring_soon: Vec<ExpiringLease> = snapshot
        .seats
        .iter()
        .filter_map(|seat| {
            let occupant = seat.occupant.as_ref()?;
            let end = NaiveDate::parse_from_str(&occupant.end_date, "%Y-%m-%d").ok()?;
            let days_remaining = (end - today).num_days().max(0);
            (days_remaining <= window_days).then(|| ExpiringLease {
                number: seat.number,
                student_name: occupant.student_name.clone(),
                end_date: occupant.end_date.clone(),
                days_remaining,
            })
        })
        .collect();
    expiring_soon.sort_by_key(|lease| (lease.days_remaining, lease.number));

    DashboardSummary {
        total_seats: snapshot.seats.len(),
        occupied,
        free: snapshot.seats.len() - occupied,
        expiring_soon,
        updated_at: snapshot.updated_at,
    }
}
