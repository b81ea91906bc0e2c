//! Fetch orchestration subsystem.
//!
//! `MovieService` composes the cache, circuit breaker, retry policy and
//! per-attempt timeout into `get_movies`, and maps terminal failures to
//! user-facing messages through `FetchError`.

pub mod error;
pub mod orchestrator;

pub use error::{FetchError, FetchResult};
pub use orchestrator::{MovieService, MoviesOutcome, RefreshOutcome};
