use std::sync::Arc;

use embarq_reservation::{AvailabilityQuery, ReservationEngine, Sweeper};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub availability: Arc<AvailabilityQuery>,
    pub sweeper: Arc<Sweeper>,
    pub metrics: Arc<Metrics>,
}
