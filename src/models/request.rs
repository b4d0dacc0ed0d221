use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::error::LedgerError;

// (struct field, wire name), in the order missing fields are reported
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("seat_number", "seatNumber"),
    ("student_name", "studentName"),
    ("phone_number", "phoneNumber"),
    ("plan", "plan"),
    ("start_date", "startDate"),
    ("end_date", "endDate"),
    ("gender", "gender"),
    ("issued_at", "issuedAt"),
    ("receipt_id", "receiptId"),
];

/// Body of `POST /api/seats/assign`, as received.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[validate(required)]
    pub seat_number: Option<Value>,
    #[validate(required, length(min = 1))]
    pub student_name: Option<String>,
    #[validate(required, length(min = 1))]
    pub phone_number: Option<String>,
    #[validate(required, length(min = 1))]
    pub gender: Option<String>,
    #[validate(required, length(min = 1))]
    pub plan: Option<String>,
    #[validate(required, length(min = 1))]
    pub start_date: Option<String>,
    #[validate(required, length(min = 1))]
    pub end_date: Option<String>,
    pub amount: Option<Value>,
    #[validate(required, length(min = 1))]
    pub issued_at: Option<String>,
    #[validate(required, length(min = 1))]
    pub receipt_id: Option<String>,
}

/// A fully validated assignment. Everything except `assigned_at` is stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignDetails {
    pub seat_number: i64,
    pub student_name: String,
    pub phone_number: String,
    pub gender: String,
    pub plan: String,
    pub start_date: String,
    pub end_date: String,
    pub amount: Option<f64>,
    pub issued_at: String,
    pub receipt_id: String,
}

impl AssignRequest {
    /// Checks the payload without touching any seat state.
    pub fn into_details(self) -> Result<AssignDetails, LedgerError> {
        let mut missing: Vec<&str> = Vec::new();
        if let Err(errors) = self.validate() {
            let fields = errors.field_errors();
            missing = REQUIRED_FIELDS
                .iter()
                .filter(|(field, wire)| fields.contains_key(*field) || fields.contains_key(*wire))
                .map(|(_, wire)| *wire)
                .collect();
        }
        // null and "" arrive as Some(..), which `required` accepts
        if is_blank(self.seat_number.as_ref()) && !missing.contains(&"seatNumber") {
            missing.insert(0, "seatNumber");
        }
        if !missing.is_empty() {
            return Err(LedgerError::InvalidAssignPayload(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let seat_number = self
            .seat_number
            .as_ref()
            .and_then(parse_seat_number)
            .ok_or_else(|| {
                LedgerError::InvalidAssignPayload("seatNumber must be an integer".to_string())
            })?;
        let amount = parse_amount(self.amount.as_ref())?;

        // validate() guarantees every required field is present at this point
        Ok(AssignDetails {
            seat_number,
            student_name: self.student_name.unwrap_or_default(),
            phone_number: self.phone_number.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            plan: self.plan.unwrap_or_default(),
            start_date: self.start_date.unwrap_or_default(),
            end_date: self.end_date.unwrap_or_default(),
            amount,
            issued_at: self.issued_at.unwrap_or_default(),
            receipt_id: self.receipt_id.unwrap_or_default(),
        })
    }
}

/// Body of `POST /api/seats/release`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    pub seat_number: Option<Value>,
}

impl ReleaseRequest {
    pub fn seat_number(&self) -> Result<i64, LedgerError> {
        let value = self.seat_number.as_ref().filter(|v| !is_blank(Some(*v))).ok_or_else(|| {
            LedgerError::InvalidReleasePayload("seatNumber is required.".to_string())
        })?;
        parse_seat_number(value).ok_or_else(|| {
            LedgerError::InvalidReleasePayload("seatNumber must be an integer".to_string())
        })
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Accepts `3`, `3.0` and `"3"`. Range checking is left to the ledger.
pub fn parse_seat_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_amount(value: Option<&Value>) -> Result<Option<f64>, LedgerError> {
    let invalid = || LedgerError::InvalidAssignPayload("amount must be numeric".to_string());
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}
