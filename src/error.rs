//! Error taxonomy for the seat store, the ledger and the HTTP boundary.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures of the backing medium. All of them surface as `StoreUnavailable`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seat store unavailable: {0}")]
    Unavailable(String),

    #[error("seat store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("seat database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("seat store holds malformed data: {0}")]
    Malformed(String),
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unavailable(format!("migrations failed: {}", err))
    }
}

/// Outcome of a rejected seat operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidAssignPayload(String),

    #[error("{0}")]
    InvalidReleasePayload(String),

    #[error("Seat {0} not found.")]
    SeatNotFound(i64),

    #[error("Seat {seat} is already assigned to {occupant}.")]
    SeatAlreadyOccupied { seat: u32, occupant: String },

    #[error("Seat {0} is already available.")]
    SeatAlreadyFree(u32),

    #[error("Seat store is unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidAssignPayload(_) | LedgerError::InvalidReleasePayload(_) => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::SeatNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::SeatAlreadyOccupied { .. } | LedgerError::SeatAlreadyFree(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == StatusCode::CONFLICT
    }
}

// ==================
// HTTP boundary
// ==================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(err) => err.status_code(),
            ApiError::InvalidBody(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = Json(ErrorResponse {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
