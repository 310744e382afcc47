//! I/O side of the PCSO lotto pipeline.
//!
//! Retrieves raw rows (results page scrape, CSV import or sample data), runs
//! them through the core normalizer and aggregator, persists the JSON
//! artifacts and exposes the update trigger over HTTP.

use std::{path::PathBuf, sync::LazyLock};

pub mod config;
pub mod request;
pub mod server;
pub mod service;
pub mod storage;

pub use config::PcsoConfig;
pub use service::{Pipeline, RunReport, UpdateOutcome};

/// Loads `.env` once; the resolved path anchors `pcso.toml`
pub static ENV_GUARD: LazyLock<Result<PathBuf, dotenvy::Error>> = LazyLock::new(dotenvy::dotenv);

/// Initialise logging. `RUST_LOG` still wins over `level` when set.
pub fn setup(level: Option<log::LevelFilter>) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.unwrap_or(log::LevelFilter::Info))
        .parse_default_env();

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialised: {e}");
    }

    match ENV_GUARD.as_ref() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No .env file loaded: {e}"),
    }
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}
