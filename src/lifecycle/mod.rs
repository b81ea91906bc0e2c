//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Logging → Metrics exporter
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl-C → broadcast → watch loop / retry prompt exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
