use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, LedgerError};
use crate::models::{request::parse_seat_number, AssignRequest, ReleaseRequest, Seat};
use crate::services::receipt::{build_receipt, Receipt};
use crate::services::SeatSnapshot;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(list_seats))
        .route("/seats/assign", post(assign_seat))
        .route("/seats/release", post(release_seat))
        .route("/seats/{number}/receipt", get(seat_receipt))
}

/* ---------- responses ---------- */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMutationResponse {
    pub seat: Seat,
    pub seats: Vec<Seat>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

impl SeatMutationResponse {
    fn new(seat: Seat, snapshot: SeatSnapshot, receipt: Option<Receipt>) -> Self {
        Self {
            seat,
            seats: snapshot.seats,
            updated_at: snapshot.updated_at,
            receipt,
        }
    }
}

/* ---------- handlers ---------- */

// GET /api/seats
async fn list_seats(State(state): State<Arc<AppState>>) -> Result<Json<SeatSnapshot>, ApiError> {
    Ok(Json(state.ledger.list().await?))
}

// POST /api/seats/assign
async fn assign_seat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<SeatMutationResponse>, ApiError> {
    let Json(request) = payload?;
    let issued_at = request.issued_at.clone();

    let seat = state.ledger.assign(request).await?;
    let receipt = build_receipt(&state.config.library, &seat, issued_at.as_deref());
    let snapshot = state.ledger.list().await?;

    Ok(Json(SeatMutationResponse::new(seat, snapshot, receipt)))
}

// POST /api/seats/release
async fn release_seat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReleaseRequest>, JsonRejection>,
) -> Result<Json<SeatMutationResponse>, ApiError> {
    let Json(request) = payload?;
    let seat_number = request.seat_number()?;

    let seat = state.ledger.release(seat_number).await?;
    let snapshot = state.ledger.list().await?;

    Ok(Json(SeatMutationResponse::new(seat, snapshot, None)))
}

// GET /api/seats/{number}/receipt
async fn seat_receipt(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    let seat_number = parse_seat_number(&Value::String(number))
        .ok_or_else(|| ApiError::BadRequest("seat number must be an integer".to_string()))?;

    let seat = state.ledger.seat(seat_number).await?;
    let receipt = build_receipt(&state.config.library, &seat, None)
        .ok_or(LedgerError::SeatAlreadyFree(seat.number))?;
    Ok(Json(receipt))
}
