//! Shared fixtures for the integration tests.
#![allow(dead_code)]

pub mod contract;

use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

use seat_ledger::models::AssignRequest;
use seat_ledger::services::SeatLedger;
use seat_ledger::store::{FileSeatStore, MemorySeatStore, SeatStore};

pub fn asha_payload() -> Value {
    json!({
        "seatNumber": 3,
        "studentName": "Asha",
        "phoneNumber": "+919999999999",
        "gender": "female",
        "plan": "monthly",
        "startDate": "2024-01-01",
        "endDate": "2024-02-01",
        "amount": 1000,
        "issuedAt": "2024-01-01T10:00:00Z",
        "receiptId": "AL-3-1234",
    })
}

pub fn payload_for(seat_number: i64, name: &str) -> Value {
    let mut payload = asha_payload();
    payload["seatNumber"] = json!(seat_number);
    payload["studentName"] = json!(name);
    payload["receiptId"] = json!(format!("AL-{}-4321", seat_number));
    payload
}

pub fn request(payload: Value) -> AssignRequest {
    serde_json::from_value(payload).expect("fixture payload deserializes")
}

pub async fn memory_store(total: u32) -> Arc<dyn SeatStore> {
    let store = MemorySeatStore::new();
    store.initialize(total).await.expect("memory store initializes");
    Arc::new(store)
}

/// The TempDir must outlive the store.
pub async fn file_store(total: u32) -> (TempDir, Arc<dyn SeatStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileSeatStore::new(dir.path().join("data/seats.json"));
    store.initialize(total).await.expect("file store initializes");
    (dir, Arc::new(store))
}

pub fn ledger(store: Arc<dyn SeatStore>, total: u32) -> Arc<SeatLedger> {
    Arc::new(SeatLedger::new(store, total))
}
