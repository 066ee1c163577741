//! Application Services
//!
//! Stateless services shared by the use cases.

mod balance_reservation;
mod conflict_retry;

pub use balance_reservation::BalanceReservationEngine;
pub use conflict_retry::{ConflictRetryPolicy, ExponentialBackoffCalculator, retry_on_conflict};
