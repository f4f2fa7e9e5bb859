//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::matcher::Policy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchlistConfig {
    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Monitored IP lists, evaluated in order.
    pub lists: Vec<ListConfig>,
}

/// A single file-backed IP list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListConfig {
    /// Identifier used in logs and decisions.
    pub name: String,

    /// File with one IP address per line. Its directory must exist.
    pub path: PathBuf,

    /// How a match is turned into a decision.
    #[serde(default)]
    pub policy: Policy,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Prometheus exporter address; empty disables it.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
