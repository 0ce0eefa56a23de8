pub mod availability;
pub mod engine;
pub mod sweeper;

pub use availability::{AvailabilityError, AvailabilityQuery};
pub use engine::{ReservationEngine, ReservationError};
pub use sweeper::Sweeper;
