use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use embarq_core::SeatLedger;

use crate::engine::ReservationError;

/// Background reclamation of abandoned holds.
///
/// The sweep itself is a single bulk conditional update in the ledger, so
/// one cycle can be driven directly in tests via [`Sweeper::sweep_once`];
/// [`Sweeper::spawn`] wraps it in an interval loop with a shutdown channel
/// for production use. Confirmed rows are never touched and nothing is
/// ever deleted.
pub struct Sweeper {
    ledger: Arc<dyn SeatLedger>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(ledger: Arc<dyn SeatLedger>, interval: Duration) -> Self {
        Self { ledger, interval }
    }

    /// Run one sweep cycle: expire every blocked row whose `expires_at` is
    /// before `now`. Returns the reclaimed-row count. Idempotent for a
    /// fixed `now`.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<u64, ReservationError> {
        let reclaimed = self.ledger.expire_overdue(now).await?;
        if reclaimed > 0 {
            info!(reclaimed, "expired stale seat holds");
        }
        Ok(reclaimed)
    }

    /// Spawn the interval loop. A failed tick is logged and the loop moves
    /// on to the next tick; a missed tick only delays reclamation. Flip the
    /// watch channel to true to stop.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick of tokio's interval fires immediately.
            ticker.tick().await;
            info!(interval_secs = self.interval.as_secs(), "expiration sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_once(Utc::now()).await {
                            error!("sweep tick failed: {}", e);
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("expiration sweeper stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}
