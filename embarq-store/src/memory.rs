//! In-memory twins of the Postgres repositories, mirroring the partial
//! uniqueness semantics. Used by the engine and API test suites.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use embarq_core::{
    LedgerError, ReservationStatus, SeatLedger, SeatReservation, Trip, TripDirectory,
};

#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<SeatReservation>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row ever written, expired ones included.
    pub fn all_rows(&self) -> Vec<SeatReservation> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeatLedger for MemoryLedger {
    async fn insert_if_absent(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<SeatReservation, LedgerError> {
        let mut rows = self.rows.lock().unwrap();

        // Mirror of the partial unique index: only active rows count.
        let taken = rows
            .iter()
            .any(|r| r.trip_id == trip_id && r.seat_number == seat_number && r.is_active());
        if taken {
            return Err(LedgerError::Conflict {
                trip_id,
                seat_number,
            });
        }

        let now = Utc::now();
        let row = SeatReservation {
            id: Uuid::new_v4(),
            trip_id,
            seat_number,
            status: ReservationStatus::Blocked,
            user_id,
            expires_at: Some(expires_at),
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_active_by_trip(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<SeatReservation>, LedgerError> {
        let rows = self.rows.lock().unwrap();
        let mut active: Vec<SeatReservation> = rows
            .iter()
            .filter(|r| r.trip_id == trip_id && r.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|r| r.seat_number);
        Ok(active)
    }

    async fn confirm_if_held(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: &str,
    ) -> Result<SeatReservation, LedgerError> {
        let mut rows = self.rows.lock().unwrap();

        let row = rows.iter_mut().find(|r| {
            r.trip_id == trip_id
                && r.seat_number == seat_number
                && r.status == ReservationStatus::Blocked
                && (r.user_id.as_deref() == Some(user_id) || r.user_id.is_none())
        });

        match row {
            Some(row) => {
                row.status = ReservationStatus::Confirmed;
                row.user_id = Some(user_id.to_string());
                row.expires_at = None;
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            None => Err(LedgerError::NotHeld {
                trip_id,
                seat_number,
            }),
        }
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let mut count = 0;
        for row in rows.iter_mut() {
            if row.status == ReservationStatus::Blocked
                && row.expires_at.is_some_and(|t| t < now)
            {
                row.status = ReservationStatus::Expired;
                row.updated_at = Utc::now();
                count += 1;
            }
        }
        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryTrips {
    trips: Mutex<HashMap<Uuid, Trip>>,
}

impl MemoryTrips {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trip(&self, capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.trips.lock().unwrap().insert(id, Trip { id, capacity });
        id
    }
}

#[async_trait]
impl TripDirectory for MemoryTrips {
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<Trip>, LedgerError> {
        Ok(self.trips.lock().unwrap().get(&trip_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_conflict_on_active_row_only() {
        let ledger = MemoryLedger::new();
        let trip = Uuid::new_v4();
        let now = Utc::now();

        ledger
            .insert_if_absent(trip, 1, None, now - Duration::seconds(1))
            .await
            .unwrap();
        assert!(ledger
            .insert_if_absent(trip, 1, None, now + Duration::minutes(5))
            .await
            .is_err());

        // Expiring the row frees the seat, and the old row stays as audit.
        ledger.expire_overdue(now).await.unwrap();
        ledger
            .insert_if_absent(trip, 1, None, now + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(ledger.all_rows().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_clears_expiry_and_stamps_owner() {
        let ledger = MemoryLedger::new();
        let trip = Uuid::new_v4();

        ledger
            .insert_if_absent(trip, 8, None, Utc::now() + Duration::minutes(5))
            .await
            .unwrap();
        let confirmed = ledger.confirm_if_held(trip, 8, "u9").await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);
        assert!(confirmed.expires_at.is_none());
        assert_eq!(confirmed.user_id.as_deref(), Some("u9"));
    }
}
