use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single seat ledger row. Rows are never deleted: an expired hold stays
/// behind as an audit record and a fresh hold for the same seat is a new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatReservation {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: i32,
    pub status: ReservationStatus,
    pub user_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SeatReservation {
    /// Whether this row occupies its seat for availability purposes.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Blocked | ReservationStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Blocked,
    Confirmed,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Blocked => "blocked",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocked" => Ok(ReservationStatus::Blocked),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "expired" => Ok(ReservationStatus::Expired),
            other => Err(format!("unknown reservation status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Blocked,
            ReservationStatus::Confirmed,
            ReservationStatus::Expired,
        ] {
            let parsed: ReservationStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("held".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_active_statuses() {
        let mut row = SeatReservation {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            seat_number: 1,
            status: ReservationStatus::Blocked,
            user_id: None,
            expires_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.is_active());
        row.status = ReservationStatus::Confirmed;
        assert!(row.is_active());
        row.status = ReservationStatus::Expired;
        assert!(!row.is_active());
    }
}
