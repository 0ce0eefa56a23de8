use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct SweepResponse {
    expired: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/sweep", post(run_sweep))
}

/// Trigger one sweep cycle on demand, independently of the background
/// interval. Useful for operations and for deterministic testing.
async fn run_sweep(State(state): State<AppState>) -> Result<Json<SweepResponse>, ApiError> {
    let expired = state
        .sweeper
        .sweep_once(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    state.metrics.holds_reclaimed.inc_by(expired);
    Ok(Json(SweepResponse { expired }))
}
