use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::request::parse_seat_number;
use crate::services::receipt::generate_receipt_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/receipts/next-id", get(next_receipt_id))
}

#[derive(Debug, Deserialize)]
struct NextIdQuery {
    #[serde(rename = "seatNumber")]
    seat_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NextIdResponse {
    receipt_id: String,
}

// GET /api/receipts/next-id?seatNumber=3
async fn next_receipt_id(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NextIdQuery>, QueryRejection>,
) -> Result<Json<NextIdResponse>, ApiError> {
    let Query(query) = query?;
    let raw = query
        .seat_number
        .ok_or_else(|| ApiError::BadRequest("seatNumber is required.".to_string()))?;
    let seat_number = parse_seat_number(&Value::String(raw))
        .ok_or_else(|| ApiError::BadRequest("seatNumber must be an integer".to_string()))?;
    let seat = state.ledger.seat_in_range(seat_number)?;

    Ok(Json(NextIdResponse {
        receipt_id: generate_receipt_id(&state.config.library.receipt_prefix, seat),
    }))
}
