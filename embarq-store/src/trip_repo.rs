use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use embarq_core::{LedgerError, Trip, TripDirectory};

pub struct PgTripDirectory {
    pool: PgPool,
}

impl PgTripDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    capacity: i32,
}

#[async_trait]
impl TripDirectory for PgTripDirectory {
    async fn get_trip(&self, trip_id: Uuid) -> Result<Option<Trip>, LedgerError> {
        let row = sqlx::query_as::<_, TripRow>("SELECT id, capacity FROM trips WHERE id = $1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        Ok(row.map(|r| Trip {
            id: r.id,
            capacity: r.capacity,
        }))
    }
}
