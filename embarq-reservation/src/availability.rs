use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use embarq_core::{LedgerError, SeatLedger, SeatStatus, TripDirectory};

/// Read-only projection answering "which seats on trip T are free".
///
/// A seat is taken iff an active (blocked or confirmed) ledger row exists
/// for it. A blocked row past its expiry but not yet swept still renders
/// as taken: the staleness window is bounded by the sweep interval, traded
/// for skipping an expiry check on every read.
pub struct AvailabilityQuery {
    trips: Arc<dyn TripDirectory>,
    ledger: Arc<dyn SeatLedger>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("trip {0} not found")]
    TripNotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<LedgerError> for AvailabilityError {
    fn from(err: LedgerError) -> Self {
        AvailabilityError::Storage(err.to_string())
    }
}

impl AvailabilityQuery {
    pub fn new(trips: Arc<dyn TripDirectory>, ledger: Arc<dyn SeatLedger>) -> Self {
        Self { trips, ledger }
    }

    pub async fn list_seats(&self, trip_id: Uuid) -> Result<Vec<SeatStatus>, AvailabilityError> {
        let trip = self
            .trips
            .get_trip(trip_id)
            .await?
            .ok_or(AvailabilityError::TripNotFound(trip_id))?;

        let taken: HashSet<i32> = self
            .ledger
            .find_active_by_trip(trip_id)
            .await?
            .into_iter()
            .map(|r| r.seat_number)
            .collect();

        Ok((1..=trip.capacity)
            .map(|seat_number| SeatStatus {
                seat_number,
                available: !taken.contains(&seat_number),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use embarq_store::memory::{MemoryLedger, MemoryTrips};

    fn query_with(
        trips: Arc<MemoryTrips>,
        ledger: Arc<MemoryLedger>,
    ) -> AvailabilityQuery {
        AvailabilityQuery::new(trips, ledger)
    }

    #[tokio::test]
    async fn test_empty_trip_all_available() {
        let trips = Arc::new(MemoryTrips::new());
        let trip = trips.add_trip(10);
        let query = query_with(trips, Arc::new(MemoryLedger::new()));

        let seats = query.list_seats(trip).await.unwrap();
        assert_eq!(seats.len(), 10);
        assert!(seats.iter().all(|s| s.available));
        assert_eq!(seats[0].seat_number, 1);
        assert_eq!(seats[9].seat_number, 10);
    }

    #[tokio::test]
    async fn test_blocked_and_confirmed_seats_are_taken() {
        let trips = Arc::new(MemoryTrips::new());
        let trip = trips.add_trip(4);
        let ledger = Arc::new(MemoryLedger::new());
        let expires = Utc::now() + Duration::minutes(5);

        ledger
            .insert_if_absent(trip, 2, Some("u1".into()), expires)
            .await
            .unwrap();
        ledger
            .insert_if_absent(trip, 3, Some("u2".into()), expires)
            .await
            .unwrap();
        ledger.confirm_if_held(trip, 3, "u2").await.unwrap();

        let seats = query_with(trips, ledger).list_seats(trip).await.unwrap();
        let availability: Vec<bool> = seats.iter().map(|s| s.available).collect();
        assert_eq!(availability, vec![true, false, false, true]);
    }

    #[tokio::test]
    async fn test_unswept_stale_hold_still_renders_taken() {
        let trips = Arc::new(MemoryTrips::new());
        let trip = trips.add_trip(2);
        let ledger = Arc::new(MemoryLedger::new());

        // Past expiry but the sweeper has not run.
        ledger
            .insert_if_absent(trip, 1, None, Utc::now() - Duration::seconds(10))
            .await
            .unwrap();

        let seats = query_with(trips, ledger).list_seats(trip).await.unwrap();
        assert!(!seats[0].available);
        assert!(seats[1].available);
    }

    #[tokio::test]
    async fn test_missing_trip() {
        let query = query_with(Arc::new(MemoryTrips::new()), Arc::new(MemoryLedger::new()));
        let err = query.list_seats(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AvailabilityError::TripNotFound(_)));
    }
}
