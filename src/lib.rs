pub mod api; // REST surface over the engine contracts
pub mod booking; // Reservation transaction + error taxonomy
pub mod config;
pub mod crypto; // Field encryption + blind index
pub mod db;
pub mod engine;
pub mod limiter; // Reservation entry-point throttle
pub mod models;
pub mod scheduling; // Availability calculator + date search

pub use booking::{BookingError, ReservationRequest};
pub use engine::Engine;
pub use scheduling::{SearchOutcome, SLOT_STEP_MINUTES};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the server binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
