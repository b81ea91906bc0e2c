//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resilience, cache and orchestrator produce:
//!     → logging.rs (structured log events, refresh_id span fields)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr log stream
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
