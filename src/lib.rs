pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::SeatLedger;
use crate::store::SeatStore;

// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<SeatLedger>,
    pub config: config::Config,
}

impl AppState {
    /// Opens the configured seat store and wires the ledger on top of it.
    pub async fn new(config: config::Config) -> Result<Arc<Self>, error::StoreError> {
        let store = store::build_store(&config.storage, config.seats.total).await?;
        Ok(Self::with_store(config, store))
    }

    /// The store must already be initialized.
    pub fn with_store(config: config::Config, store: Arc<dyn SeatStore>) -> Arc<Self> {
        let ledger = Arc::new(SeatLedger::new(store, config.seats.total));
        Arc::new(Self { ledger, config })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Aspirant Library seat service" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
