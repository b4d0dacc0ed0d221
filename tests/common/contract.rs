//! Ledger and store contract checks shared by every backend's test suite.

use futures::future::join_all;
use std::sync::Arc;

use super::{asha_payload, ledger, payload_for, request};
use seat_ledger::error::LedgerError;
use seat_ledger::models::{Seat, SeatState};
use seat_ledger::services::SeatLedger;
use seat_ledger::store::{CommitOutcome, SeatStore};

pub async fn scenario_assign_conflict_release_reassign(ledger: Arc<SeatLedger>) {
    // assign seat 3 to Asha
    let seat = ledger.assign(request(asha_payload())).await.unwrap();
    let occupant = seat.occupant.clone().unwrap();
    assert_eq!(seat.number, 3);
    assert_eq!(occupant.student_name, "Asha");
    assert_eq!(occupant.phone_number, "+919999999999");
    assert_eq!(occupant.gender, "female");
    assert_eq!(occupant.plan, "monthly");
    assert_eq!(occupant.start_date, "2024-01-01");
    assert_eq!(occupant.end_date, "2024-02-01");
    assert_eq!(occupant.amount, Some(1000.0));
    assert_eq!(occupant.receipt_id, "AL-3-1234");

    let snapshot = ledger.list().await.unwrap();
    let numbers: Vec<u32> = snapshot.seats.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    for s in &snapshot.seats {
        let expected = if s.number == 3 { SeatState::Occupied } else { SeatState::Free };
        assert_eq!(s.state(), expected, "seat {}", s.number);
    }
    assert_eq!(snapshot.seats[2], seat);

    // the same assignment again conflicts and names the occupant
    match ledger.assign(request(asha_payload())).await {
        Err(LedgerError::SeatAlreadyOccupied { seat: 3, occupant }) => assert_eq!(occupant, "Asha"),
        other => panic!("expected SeatAlreadyOccupied, got {:?}", other),
    }
    assert_eq!(ledger.seat(3).await.unwrap(), seat);

    // release restores the pristine seat
    let released = ledger.release(3).await.unwrap();
    assert_eq!(released, Seat::free(3));
    assert_eq!(ledger.seat(3).await.unwrap(), Seat::free(3));
    let json = serde_json::to_value(ledger.seat(3).await.unwrap()).unwrap();
    for field in ["studentName", "phoneNumber", "gender", "plan", "startDate", "endDate", "amount", "assignedAt", "receiptId"] {
        assert!(json[field].is_null(), "{} should be null", field);
    }

    // and the seat can be taken again with different details
    let mut other = payload_for(3, "Ravi");
    other["amount"] = serde_json::Value::Null;
    let seat = ledger.assign(request(other)).await.unwrap();
    assert_eq!(seat.occupant_name(), Some("Ravi"));
    assert_eq!(seat.occupant.unwrap().amount, None);
}

pub async fn release_of_free_seat_changes_nothing(ledger: Arc<SeatLedger>) {
    let before = ledger.list().await.unwrap().seats;
    assert!(matches!(ledger.release(2).await, Err(LedgerError::SeatAlreadyFree(2))));
    assert_eq!(ledger.list().await.unwrap().seats, before);
}

pub async fn invalid_payload_never_touches_state(ledger: Arc<SeatLedger>) {
    let before = ledger.list().await.unwrap().seats;
    let mut payload = asha_payload();
    payload.as_object_mut().unwrap().remove("gender");
    payload.as_object_mut().unwrap().remove("issuedAt");
    match ledger.assign(request(payload)).await {
        Err(LedgerError::InvalidAssignPayload(msg)) => {
            assert_eq!(msg, "Missing required fields: gender, issuedAt")
        }
        other => panic!("expected InvalidAssignPayload, got {:?}", other),
    }
    assert_eq!(ledger.list().await.unwrap().seats, before);
}

pub async fn concurrent_assigns_have_one_winner(ledger: Arc<SeatLedger>) {
    let contenders = ["Asha", "Ravi", "Meera", "Kabir", "Isha", "Arjun", "Zoya", "Dev"];
    let attempts = contenders.iter().map(|name| {
        let ledger = ledger.clone();
        let payload = payload_for(4, name);
        tokio::spawn(async move { ledger.assign(request(payload)).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners: Vec<&Seat> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one assign must succeed");
    let winner = winners[0].occupant_name().unwrap().to_string();

    for result in &results {
        match result {
            Ok(_) => {}
            Err(LedgerError::SeatAlreadyOccupied { seat: 4, occupant }) => assert_eq!(occupant, &winner),
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    // the stored occupant is the winner's record, not a blend
    let stored = ledger.seat(4).await.unwrap();
    assert_eq!(&stored, winners[0]);
    assert_eq!(
        stored.occupant.unwrap().receipt_id,
        "AL-4-4321"
    );
}

pub async fn concurrent_releases_have_one_winner(ledger: Arc<SeatLedger>) {
    ledger.assign(request(payload_for(5, "Asha"))).await.unwrap();
    let attempts = (0..6).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.release(5).await })
    });
    let results: Vec<_> = join_all(attempts).await.into_iter().map(|j| j.unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, LedgerError::SeatAlreadyFree(5))));
}

pub async fn commit_then_load_round_trips(store: Arc<dyn SeatStore>) {
    let ledger = ledger(store.clone(), 5);
    let seat = ledger.assign(request(payload_for(1, "Asha"))).await.unwrap();

    // the stored timestamp comes back exactly as stamped
    let assigned_at = seat.occupant.as_ref().unwrap().assigned_at;
    assert_eq!(assigned_at.timestamp_subsec_nanos() % 1_000_000, 0);

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded[0], seat);
    assert_eq!(store.find_by_number(1).await.unwrap(), Some(seat.clone()));
    assert_eq!(store.find_by_number(42).await.unwrap(), None);

    // a stale commit is refused and leaves the stored seat alone
    let outcome = store.commit(&Seat::free(1), SeatState::Free).await.unwrap();
    assert_eq!(outcome, CommitOutcome::Conflict);
    assert_eq!(store.find_by_number(1).await.unwrap(), Some(seat));
}

pub async fn initialize_keeps_existing_seats(store: Arc<dyn SeatStore>) {
    let ledger = ledger(store.clone(), 5);
    ledger.assign(request(payload_for(2, "Asha"))).await.unwrap();
    store.initialize(5).await.unwrap();
    store.initialize(9).await.unwrap();
    let seats = store.load().await.unwrap();
    assert_eq!(seats.len(), 5);
    assert_eq!(seats[1].occupant_name(), Some("Asha"));
}
