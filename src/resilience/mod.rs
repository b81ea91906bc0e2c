//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Refresh of the movie collection:
//!     → circuit_breaker.rs (reject fast while the upstream is presumed down)
//!     → retries.rs (bounded attempts, backoff.rs doubles the delay)
//!         → timeouts.rs (fresh deadline per attempt, cancel on expiry)
//!     → circuit_breaker.rs (one success/failure per whole operation)
//! ```
//!
//! clock.rs supplies wall-clock milliseconds to the breaker and cache ages;
//! backoff and deadlines run on tokio time.

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use retries::{execute_with_retry, RetryContext, RetryPolicy};
pub use timeouts::{Elapsed, TimeoutGuard};
