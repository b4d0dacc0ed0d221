pub mod dashboard;
pub mod health;
pub mod receipts;
pub mod seats;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(seats::routes())
        .merge(dashboard::routes())
        .merge(receipts::routes())
}
