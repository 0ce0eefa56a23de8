use axum::{extract::State, routing::get, Router};
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    pub holds_created: IntCounter,
    pub hold_conflicts: IntCounter,
    pub holds_confirmed: IntCounter,
    pub confirm_failures: IntCounter,
    pub holds_reclaimed: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let holds_created =
            IntCounter::new("embarq_holds_created_total", "Seat holds created").expect("metric");
        let hold_conflicts = IntCounter::new(
            "embarq_hold_conflicts_total",
            "Seat hold attempts rejected as already blocked",
        )
        .expect("metric");
        let holds_confirmed =
            IntCounter::new("embarq_holds_confirmed_total", "Seat holds confirmed")
                .expect("metric");
        let confirm_failures = IntCounter::new(
            "embarq_confirm_failures_total",
            "Confirmations rejected because no matching hold existed",
        )
        .expect("metric");
        let holds_reclaimed = IntCounter::new(
            "embarq_holds_reclaimed_total",
            "Stale holds reclaimed via the admin sweep endpoint",
        )
        .expect("metric");

        for c in [
            &holds_created,
            &hold_conflicts,
            &holds_confirmed,
            &confirm_failures,
            &holds_reclaimed,
        ] {
            registry.register(Box::new(c.clone())).expect("register metric");
        }

        Self {
            registry,
            holds_created,
            hold_conflicts,
            holds_confirmed,
            confirm_failures,
            holds_reclaimed,
        }
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::error!("failed to encode metrics: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/metrics", get(render_metrics))
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
