use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::dashboard::{summarize, DashboardSummary};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(stats))
}

// GET /api/stats
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<DashboardSummary>, ApiError> {
    let snapshot = state.ledger.list().await?;
    let today = Utc::now().date_naive();
    Ok(Json(summarize(
        &snapshot,
        today,
        state.config.dashboard.expiring_within_days,
    )))
}
