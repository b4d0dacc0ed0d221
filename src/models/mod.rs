pub mod seat;
pub mod request;

pub use seat::{Occupant, Seat, SeatRecord, SeatState};
pub use request::{AssignDetails, AssignRequest, ReleaseRequest};
