pub mod dashboard;
pub mod ledger;
pub mod receipt;

pub use ledger::{SeatLedger, SeatSnapshot};
