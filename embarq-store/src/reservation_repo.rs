use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use embarq_core::{LedgerError, ReservationStatus, SeatLedger, SeatReservation};

/// Postgres-backed seat ledger.
///
/// All mutual exclusion happens inside Postgres: the conditional insert
/// races at the partial unique index on `(trip_id, seat_number)` for
/// active rows, and confirmation is a single conditional UPDATE. No
/// transaction spans more than one statement.
pub struct PgSeatLedger {
    pool: PgPool,
}

impl PgSeatLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    trip_id: Uuid,
    seat_number: i32,
    status: String,
    user_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReservationRow {
    fn into_reservation(self) -> Result<SeatReservation, LedgerError> {
        let status: ReservationStatus = self
            .status
            .parse()
            .map_err(LedgerError::Storage)?;
        Ok(SeatReservation {
            id: self.id,
            trip_id: self.trip_id,
            seat_number: self.seat_number,
            status,
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn storage_err(e: sqlx::Error) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

const RETURNING: &str =
    "RETURNING id, trip_id, seat_number, status, user_id, expires_at, created_at, updated_at";

#[async_trait]
impl SeatLedger for PgSeatLedger {
    async fn insert_if_absent(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<SeatReservation, LedgerError> {
        let sql = format!(
            r#"
            INSERT INTO seat_reservations (id, trip_id, seat_number, status, user_id, expires_at)
            VALUES ($1, $2, $3, 'blocked', $4, $5)
            ON CONFLICT (trip_id, seat_number) WHERE status IN ('blocked', 'confirmed')
            DO NOTHING
            {}
            "#,
            RETURNING
        );

        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(trip_id)
            .bind(seat_number)
            .bind(user_id)
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(row) => row.into_reservation(),
            // DO NOTHING returned no row: an active row already holds the seat.
            None => Err(LedgerError::Conflict {
                trip_id,
                seat_number,
            }),
        }
    }

    async fn find_active_by_trip(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<SeatReservation>, LedgerError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, trip_id, seat_number, status, user_id, expires_at, created_at, updated_at
            FROM seat_reservations
            WHERE trip_id = $1 AND status IN ('blocked', 'confirmed')
            ORDER BY seat_number
            "#,
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(|r| r.into_reservation()).collect()
    }

    async fn confirm_if_held(
        &self,
        trip_id: Uuid,
        seat_number: i32,
        user_id: &str,
    ) -> Result<SeatReservation, LedgerError> {
        let sql = format!(
            r#"
            UPDATE seat_reservations
            SET status = 'confirmed', user_id = $3, expires_at = NULL, updated_at = NOW()
            WHERE trip_id = $1 AND seat_number = $2
              AND status = 'blocked'
              AND (user_id = $3 OR user_id IS NULL)
            {}
            "#,
            RETURNING
        );

        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(trip_id)
            .bind(seat_number)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(row) => row.into_reservation(),
            None => Err(LedgerError::NotHeld {
                trip_id,
                seat_number,
            }),
        }
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            r#"
            UPDATE seat_reservations
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'blocked' AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected())
    }
}
