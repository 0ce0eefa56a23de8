use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use embarq_core::SeatStatus;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/trips/{trip_id}/seats", get(list_seats))
}

async fn list_seats(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<SeatStatus>>, ApiError> {
    let seats = state.availability.list_seats(trip_id).await?;
    Ok(Json(seats))
}
