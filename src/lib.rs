pub mod config;
pub mod error;
pub mod export;
pub mod report;
pub mod runner;
pub mod stats;
pub mod target;

use tracing_subscriber::EnvFilter;

/// Diagnostics go to stdout next to the report, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
