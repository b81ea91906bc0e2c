//! Resilient movie collection client.
//!
//! Fetches a JSON array of movies over HTTP, keeps the last good snapshot on
//! disk, and keeps serving it while the upstream is slow, failing or
//! overloaded.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod movies;
pub mod observability;
pub mod render;
pub mod resilience;

pub use config::FetchConfig;
pub use fetch::{FetchError, MovieService, MoviesOutcome, RefreshOutcome};
pub use movies::Record;
