//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! MovieService refresh attempt
//!     → client.rs (GET api url via reqwest)
//!     → 2xx: raw body bytes
//!     → otherwise: FetchError (HttpStatus / Network)
//! ```

pub mod client;

pub use client::{HttpTransport, Transport};
