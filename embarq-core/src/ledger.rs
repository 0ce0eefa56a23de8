use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::reservation::SeatReservation;
use crate::trip::Trip;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// An active (blocked or confirmed) row already holds this seat.
    #[error("seat {seat_number} on trip {trip_id} is already taken")]
    Conflict { trip_id: Uuid, seat_number: i32 },

    /// No blocked row matched the confirmation predicate: the hold is
    /// missing, expired, or owned by someone else.
    #[error("no matching hold for seat {seat_number} on trip {trip_id}")]
    NotHeld { trip_id: Uuid, seat_number: i32 },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Durable, uniqueness-enforcing persistence for seat reservation rows.
///
/// All mutual exclusion lives behind this trait: `insert_if_absent` is a
/// conditional insert adjudicated by the storage layer's uniqueness
/// constraint, `confirm_if_held` is a compare-and-swap on status. Callers
/// hold no locks.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    /// Insert a fresh hold. Fails with [`LedgerError::Conflict`] when an
    /// active row already exists for `(trip_id, seat_number)`; expired rows
    /// do not count. Concurrent calls for the same pair produce exactly one
    /// success.
    async fn insert_if_absent(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<SeatReservation, LedgerError>;

    /// Rows with status blocked or confirmed for the trip.
    async fn find_active_by_trip(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<SeatReservation>, LedgerError>;

    /// Atomically promote a blocked row to confirmed. Matches only a row
    /// whose owner is `user_id` or whose owner is unset (an anonymous hold
    /// is claimed by the confirming user); clears `expires_at` and stamps
    /// the owner. Fails with [`LedgerError::NotHeld`] when nothing matches.
    async fn confirm_if_held(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: &str,
    ) -> Result<SeatReservation, LedgerError>;

    /// Mark every blocked row whose `expires_at` has passed as expired and
    /// return the number of rows touched. Each row's transition is
    /// independent, so this is safe to run concurrently with inserts and
    /// confirmations, and calling it twice for the same instant is a no-op
    /// the second time.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, LedgerError>;
}

/// Read-only access to trips, which this core does not own.
#[async_trait]
pub trait TripDirectory: Send + Sync {
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<Trip>, LedgerError>;
}
