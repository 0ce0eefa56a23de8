use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use embarq_reservation::{AvailabilityError, ReservationError};

/// API boundary error. Every variant maps to a stable error code plus a
/// human-readable message in the JSON body.
#[derive(Debug)]
pub enum ApiError {
    SeatAlreadyBlocked(String),
    SeatNotBlocked(String),
    TripNotFound(String),
    ValidationError(String),
    Anyhow(anyhow::Error),
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::SeatAlreadyBlocked(msg) => {
                (StatusCode::CONFLICT, "SEAT_ALREADY_BLOCKED", msg)
            }
            ApiError::SeatNotBlocked(msg) => (StatusCode::CONFLICT, "SEAT_NOT_BLOCKED", msg),
            ApiError::TripNotFound(msg) => (StatusCode::NOT_FOUND, "TRIP_NOT_FOUND", msg),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal Server Error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::SeatAlreadyBlocked { .. } => {
                ApiError::SeatAlreadyBlocked(err.to_string())
            }
            ReservationError::SeatNotBlocked { .. } => ApiError::SeatNotBlocked(err.to_string()),
            ReservationError::Storage(msg) => ApiError::Anyhow(anyhow::anyhow!(msg)),
        }
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::TripNotFound(_) => ApiError::TripNotFound(err.to_string()),
            AvailabilityError::Storage(msg) => ApiError::Anyhow(anyhow::anyhow!(msg)),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let conflict: ApiError = ReservationError::SeatAlreadyBlocked {
            trip_id: Uuid::new_v4(),
            seat_number: 5,
        }
        .into();
        assert_eq!(conflict.parts().0, StatusCode::CONFLICT);

        let not_blocked: ApiError = ReservationError::SeatNotBlocked {
            trip_id: Uuid::new_v4(),
            seat_number: 5,
        }
        .into();
        let (status, code, _) = not_blocked.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "SEAT_NOT_BLOCKED");

        let missing: ApiError = AvailabilityError::TripNotFound(Uuid::new_v4()).into();
        assert_eq!(missing.parts().0, StatusCode::NOT_FOUND);
    }
}
