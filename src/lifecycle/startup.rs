//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Logging comes up before lists so provisioning is logged
//! - Lists start last, each with its watcher running

use std::path::Path;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::config::{load_config, ConfigError, WatchlistConfig};
use crate::error::ListError;
use crate::lifecycle::Shutdown;
use crate::matcher::Guard;
use crate::observability::{logging, metrics};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not initialize logging: {0}")]
    Logging(#[from] TryInitError),

    #[error("could not start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("could not provision IP list: {0}")]
    List(#[from] ListError),
}

/// Load configuration and bring up logging and metrics.
pub fn init(config_path: &Path) -> Result<WatchlistConfig, StartupError> {
    let config = load_config(config_path)?;
    logging::init_logging(&config.observability)?;

    // Validation already checked the address.
    if let Ok(addr) = config.observability.metrics_address.parse() {
        metrics::init_metrics(addr)?;
    }

    tracing::info!(
        config = %config_path.display(),
        lists = config.lists.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Provision every configured list. Must be called from within a Tokio runtime.
pub fn provision(config: &WatchlistConfig, shutdown: &Shutdown) -> Result<Guard, StartupError> {
    Ok(Guard::provision(&config.lists, shutdown)?)
}
