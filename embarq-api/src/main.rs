use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use embarq_api::{app, metrics::Metrics, state::AppState};
use embarq_reservation::{AvailabilityQuery, ReservationEngine, Sweeper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "embarq_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = embarq_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Embarq API on port {}", config.server.port);

    let db = embarq_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let ledger = Arc::new(embarq_store::PgSeatLedger::new(db.pool.clone()));
    let trips = Arc::new(embarq_store::PgTripDirectory::new(db.pool.clone()));

    let engine = Arc::new(ReservationEngine::new(
        ledger.clone(),
        chrono::Duration::seconds(config.business_rules.seat_hold_seconds as i64),
    ));
    let availability = Arc::new(AvailabilityQuery::new(trips, ledger.clone()));
    let sweeper = Arc::new(Sweeper::new(
        ledger,
        Duration::from_secs(config.business_rules.sweep_interval_seconds),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper_handle = sweeper.clone().spawn(shutdown_rx);

    let app_state = AppState {
        engine,
        availability,
        sweeper,
        metrics: Arc::new(Metrics::new()),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .unwrap();

    let _ = shutdown_tx.send(true);
    let _ = sweeper_handle.await;
}
