use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use embarq_core::{LedgerError, SeatLedger, SeatReservation};

/// Orchestrates the two passenger-facing operations: placing a time-boxed
/// hold on a seat and promoting a hold to a confirmed ticket.
///
/// The engine itself is stateless. Both races — two buyers grabbing the
/// same seat, and a confirm racing the sweeper — are adjudicated by the
/// ledger's conditional insert and conditional update, so any number of
/// engine instances can run against the same store.
pub struct ReservationEngine {
    ledger: Arc<dyn SeatLedger>,
    hold_duration: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("seat {seat_number} on trip {trip_id} is already blocked")]
    SeatAlreadyBlocked { trip_id: Uuid, seat_number: i32 },

    #[error("seat {seat_number} on trip {trip_id} is not blocked for this user")]
    SeatNotBlocked { trip_id: Uuid, seat_number: i32 },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LedgerError> for ReservationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict {
                trip_id,
                seat_number,
            } => ReservationError::SeatAlreadyBlocked {
                trip_id,
                seat_number,
            },
            LedgerError::NotHeld {
                trip_id,
                seat_number,
            } => ReservationError::SeatNotBlocked {
                trip_id,
                seat_number,
            },
            LedgerError::Storage(msg) => ReservationError::Storage(msg),
        }
    }
}

impl ReservationEngine {
    pub fn new(ledger: Arc<dyn SeatLedger>, hold_duration: Duration) -> Self {
        Self {
            ledger,
            hold_duration,
        }
    }

    /// Place a hold on a seat, expiring `hold_duration` from now.
    ///
    /// Exactly one of N concurrent calls for the same `(trip_id,
    /// seat_number)` succeeds; the rest fail with `SeatAlreadyBlocked`.
    /// No retries: retry policy belongs to the caller.
    pub async fn reserve_seat(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: Option<String>,
    ) -> Result<SeatReservation, ReservationError> {
        let expires_at = Utc::now() + self.hold_duration;
        let reservation = self
            .ledger
            .insert_if_absent(trip_id, seat_number, user_id, expires_at)
            .await?;

        tracing::info!(
            %trip_id,
            seat_number,
            expires_at = %reservation.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            "seat hold created"
        );
        Ok(reservation)
    }

    /// Promote a hold to a confirmed ticket. Fails with `SeatNotBlocked`
    /// when the hold is missing, already expired, or owned by a different
    /// user; an anonymous hold is claimed by the confirming user.
    pub async fn confirm_seat(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: &str,
    ) -> Result<SeatReservation, ReservationError> {
        let reservation = self
            .ledger
            .confirm_if_held(trip_id, seat_number, user_id)
            .await?;

        tracing::info!(%trip_id, seat_number, user_id, "seat hold confirmed");
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embarq_core::ReservationStatus;
    use embarq_store::memory::MemoryLedger;

    fn engine_with(ledger: Arc<MemoryLedger>) -> ReservationEngine {
        ReservationEngine::new(ledger, Duration::minutes(5))
    }

    #[tokio::test]
    async fn test_reserve_then_confirm() {
        let ledger = Arc::new(MemoryLedger::new());
        let engine = engine_with(ledger.clone());
        let trip = Uuid::new_v4();

        let held = engine
            .reserve_seat(trip, 5, Some("u1".into()))
            .await
            .unwrap();
        assert_eq!(held.status, ReservationStatus::Blocked);
        assert!(held.expires_at.unwrap() > Utc::now());

        let confirmed = engine.confirm_seat(trip, 5, "u1").await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert!(confirmed.expires_at.is_none());
        assert_eq!(confirmed.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_second_hold_conflicts() {
        let engine = engine_with(Arc::new(MemoryLedger::new()));
        let trip = Uuid::new_v4();

        engine
            .reserve_seat(trip, 5, Some("u1".into()))
            .await
            .unwrap();
        let err = engine
            .reserve_seat(trip, 5, Some("u2".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReservationError::SeatAlreadyBlocked { seat_number: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_confirm_wrong_owner() {
        let engine = engine_with(Arc::new(MemoryLedger::new()));
        let trip = Uuid::new_v4();

        engine
            .reserve_seat(trip, 7, Some("owner".into()))
            .await
            .unwrap();
        let err = engine.confirm_seat(trip, 7, "intruder").await.unwrap_err();
        assert!(matches!(err, ReservationError::SeatNotBlocked { .. }));

        // The rightful owner still confirms.
        engine.confirm_seat(trip, 7, "owner").await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_never_held_seat() {
        let engine = engine_with(Arc::new(MemoryLedger::new()));
        let err = engine
            .confirm_seat(Uuid::new_v4(), 1, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::SeatNotBlocked { .. }));
    }

    #[tokio::test]
    async fn test_anonymous_hold_claimed_on_confirm() {
        let engine = engine_with(Arc::new(MemoryLedger::new()));
        let trip = Uuid::new_v4();

        let held = engine.reserve_seat(trip, 3, None).await.unwrap();
        assert!(held.user_id.is_none());

        let confirmed = engine.confirm_seat(trip, 3, "claimant").await.unwrap();
        assert_eq!(confirmed.user_id.as_deref(), Some("claimant"));
    }

    #[tokio::test]
    async fn test_uniqueness_under_race() {
        let ledger = Arc::new(MemoryLedger::new());
        let engine = Arc::new(engine_with(ledger));
        let trip = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..32 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.reserve_seat(trip, 12, Some(format!("u{}", i))).await
            }));
        }

        let mut winners = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(ReservationError::SeatAlreadyBlocked { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 31);
    }

    #[tokio::test]
    async fn test_concurrent_confirms_single_winner() {
        let engine = Arc::new(engine_with(Arc::new(MemoryLedger::new())));
        let trip = Uuid::new_v4();
        engine.reserve_seat(trip, 2, None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine.confirm_seat(trip, 2, &format!("u{}", i)).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }
        // The first compare-and-swap flips status, all later matches miss.
        assert_eq!(winners, 1);
    }
}
