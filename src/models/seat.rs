use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Free,
    Occupied,
}

/// The lease record attached to a seat while it is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub student_name: String,
    pub phone_number: String,
    pub gender: String,
    pub plan: String,
    pub start_date: String,
    pub end_date: String,
    pub amount: Option<f64>,
    pub assigned_at: DateTime<Utc>,
    pub receipt_id: String,
}

/// One physical seat. Occupant presence is the only source of the seat's state.
///
/// On the wire and on disk a seat is a flat record where every occupant field is
/// `null` while the seat is free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SeatRecord", try_from = "SeatRecord")]
pub struct Seat {
    pub number: u32,
    pub occupant: Option<Occupant>,
}

impl Seat {
    pub fn free(number: u32) -> Self {
        Self { number, occupant: None }
    }

    pub fn occupied(number: u32, occupant: Occupant) -> Self {
        Self {
            number,
            occupant: Some(occupant),
        }
    }

    pub fn state(&self) -> SeatState {
        if self.occupant.is_some() {
            SeatState::Occupied
        } else {
            SeatState::Free
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant_name(&self) -> Option<&str> {
        self.occupant.as_ref().map(|o| o.student_name.as_str())
    }
}

/// Flat serialized form of a [`Seat`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    pub number: u32,
    pub student_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub plan: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub amount: Option<f64>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub receipt_id: Option<String>,
}

impl From<Seat> for SeatRecord {
    fn from(seat: Seat) -> Self {
        match seat.occupant {
            None => SeatRecord {
                number: seat.number,
                ..Default::default()
            },
            Some(o) => SeatRecord {
                number: seat.number,
                student_name: Some(o.student_name),
                phone_number: Some(o.phone_number),
                gender: Some(o.gender),
                plan: Some(o.plan),
                start_date: Some(o.start_date),
                end_date: Some(o.end_date),
                amount: o.amount,
                assigned_at: Some(o.assigned_at),
                receipt_id: Some(o.receipt_id),
            },
        }
    }
}

impl TryFrom<SeatRecord> for Seat {
    type Error = String;

    fn try_from(r: SeatRecord) -> Result<Self, Self::Error> {
        if r.number == 0 {
            return Err("seat number must be positive".to_string());
        }
        match (
            r.student_name,
            r.phone_number,
            r.gender,
            r.plan,
            r.start_date,
            r.end_date,
            r.assigned_at,
            r.receipt_id,
        ) {
            (None, None, None, None, None, None, None, None) if r.amount.is_none() => {
                Ok(Seat::free(r.number))
            }
            (
                Some(student_name),
                Some(phone_number),
                Some(gender),
                Some(plan),
                Some(start_date),
                Some(end_date),
                Some(assigned_at),
                Some(receipt_id),
            ) => Ok(Seat::occupied(
                r.number,
                Occupant {
                    student_name,
                    phone_number,
                    gender,
                    plan,
                    start_date,
                    end_date,
                    amount: r.amount,
                    assigned_at,
                    receipt_id,
                },
            )),
            _ => Err(format!("seat {} has a partial occupant record", r.number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn asha() -> Occupant {
        Occupant {
            student_name: "Asha".to_string(),
            phone_number: "+919999999999".to_string(),
            gender: "female".to_string(),
            plan: "monthly".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-02-01".to_string(),
            amount: Some(1000.0),
            assigned_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            receipt_id: "AL-3-1234".to_string(),
        }
    }

    #[test]
    fn free_seat_serializes_every_field_as_null() {
        let value = serde_json::to_value(Seat::free(4)).unwrap();
        assert_eq!(
            value,
            json!({
                "number": 4,
                "studentName": null,
                "phoneNumber": null,
                "gender": null,
                "plan": null,
                "startDate": null,
                "endDate": null,
                "amount": null,
                "assignedAt": null,
                "receiptId": null,
            })
        );
    }

    #[test]
    fn occupied_seat_uses_camel_case_fields() {
        let value = serde_json::to_value(Seat::occupied(3, asha())).unwrap();
        assert_eq!(value["studentName"], "Asha");
        assert_eq!(value["receiptId"], "AL-3-1234");
        assert_eq!(value["amount"], 1000.0);
        assert_eq!(value["assignedAt"], "2024-01-01T10:00:00Z");
    }

    #[test]
    fn occupied_seat_without_amount_keeps_null_amount() {
        let mut occupant = asha();
        occupant.amount = None;
        let seat = Seat::occupied(3, occupant);
        let back: Seat = serde_json::from_value(serde_json::to_value(&seat).unwrap()).unwrap();
        assert_eq!(back, seat);
        assert_eq!(back.state(), SeatState::Occupied);
    }

    #[test]
    fn partial_occupant_is_rejected() {
        let err = serde_json::from_value::<Seat>(json!({
            "number": 2,
            "studentName": "Ravi",
            "phoneNumber": null,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("partial occupant"));
    }

    #[test]
    fn amount_alone_is_a_partial_record() {
        assert!(serde_json::from_value::<Seat>(json!({ "number": 2, "amount": 500 })).is_err());
    }
}
