pub mod ledger;
pub mod reservation;
pub mod trip;

pub use ledger::{LedgerError, SeatLedger, TripDirectory};
pub use reservation::{ReservationStatus, SeatReservation};
pub use trip::{SeatStatus, Trip};
