//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! iplist / matcher produce:
//!     → logging.rs (structured log events, one span per list)
//!     → metrics.rs (reload, watch and match counters)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
