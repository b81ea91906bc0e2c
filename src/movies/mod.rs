//! Movie domain types.

pub mod record;

pub use record::{MovieId, Record};

/// Decode a response body into records.
///
/// The body must be a JSON array; its elements are decoded leniently.
pub fn decode_records(body: &[u8]) -> Result<Vec<Record>, serde_json::Error> {
    serde_json::from_slice(body)
}
