use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trip as seen by this core: owned elsewhere, read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub capacity: i32,
}

/// One entry of the availability projection for a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    pub seat_number: i32,
    pub available: bool,
}
