use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use embarq_core::SeatReservation;
use embarq_reservation::ReservationError;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HoldSeatRequest {
    pub trip_id: Uuid,
    pub seat_number: i32,
    /// Optional: an anonymous hold is claimed by whoever confirms it.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmSeatRequest {
    pub trip_id: Uuid,
    pub seat_number: i32,
    pub user_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations/hold", post(hold_seat))
        .route("/v1/reservations/confirm", post(confirm_seat))
}

async fn hold_seat(
    State(state): State<AppState>,
    Json(req): Json<HoldSeatRequest>,
) -> Result<(StatusCode, Json<SeatReservation>), ApiError> {
    if req.seat_number < 1 {
        return Err(ApiError::ValidationError(
            "seat_number must be a positive integer".to_string(),
        ));
    }

    let result = state
        .engine
        .reserve_seat(req.trip_id, req.seat_number, req.user_id)
        .await;

    match result {
        Ok(reservation) => {
            state.metrics.holds_created.inc();
            Ok((StatusCode::CREATED, Json(reservation)))
        }
        Err(err) => {
            if matches!(err, ReservationError::SeatAlreadyBlocked { .. }) {
                state.metrics.hold_conflicts.inc();
            }
            Err(err.into())
        }
    }
}

async fn confirm_seat(
    State(state): State<AppState>,
    Json(req): Json<ConfirmSeatRequest>,
) -> Result<Json<SeatReservation>, ApiError> {
    let result = state
        .engine
        .confirm_seat(req.trip_id, req.seat_number, &req.user_id)
        .await;

    match result {
        Ok(reservation) => {
            state.metrics.holds_confirmed.inc();
            Ok(Json(reservation))
        }
        Err(err) => {
            if matches!(err, ReservationError::SeatNotBlocked { .. }) {
                state.metrics.confirm_failures.inc();
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_request_allows_anonymous_user() {
        let req: HoldSeatRequest = serde_json::from_value(serde_json::json!({
            "trip_id": Uuid::new_v4(),
            "seat_number": 5
        }))
        .unwrap();
        assert_eq!(req.seat_number, 5);
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_confirm_request_requires_user() {
        let result: Result<ConfirmSeatRequest, _> = serde_json::from_value(serde_json::json!({
            "trip_id": Uuid::new_v4(),
            "seat_number": 5
        }));
        assert!(result.is_err());
    }
}
