//! Fetch error taxonomy.

use thiserror::Error;

use crate::resilience::Elapsed;

/// Terminal failure of a movie refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// An attempt exceeded its deadline and was cancelled.
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// A response arrived with a non-2xx status.
    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// No response: connection refused, DNS, reset, TLS and the like.
    #[error("network error: {0}")]
    Network(String),

    /// The body was not a JSON array.
    #[error("invalid api response format: {0}")]
    Format(String),

    /// The circuit breaker refused the attempt.
    #[error("circuit open")]
    CircuitOpen,
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "request timed out. please try again.",
            FetchError::HttpStatus(_) => "server error. please try later.",
            FetchError::Network(_) => "network error. check your connection.",
            FetchError::Format(_) => "unable to load movies.",
            FetchError::CircuitOpen => "service temporarily unavailable. please try again later.",
        }
    }

    /// Metric label for the outcome counter.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::HttpStatus(_) => "http_status",
            FetchError::Network(_) => "network",
            FetchError::Format(_) => "format",
            FetchError::CircuitOpen => "circuit_open",
        }
    }

    /// Whether this outcome counts against the circuit breaker.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, FetchError::CircuitOpen)
    }
}

impl From<Elapsed> for FetchError {
    fn from(e: Elapsed) -> Self {
        FetchError::Timeout {
            after_ms: e.0.as_millis() as u64,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout { after_ms: 0 };
        }
        if let Some(status) = e.status() {
            return FetchError::HttpStatus(status.as_u16());
        }
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FetchError::Timeout { after_ms: 8000 }.user_message(),
            "request timed out. please try again."
        );
        assert_eq!(FetchError::HttpStatus(503).user_message(), "server error. please try later.");
        assert_eq!(
            FetchError::Network("refused".into()).user_message(),
            "network error. check your connection."
        );
        assert_eq!(FetchError::Format("object".into()).user_message(), "unable to load movies.");
        assert_eq!(
            FetchError::CircuitOpen.user_message(),
            "service temporarily unavailable. please try again later."
        );
    }

    #[test]
    fn test_circuit_open_is_not_a_failure() {
        assert!(!FetchError::CircuitOpen.counts_as_failure());
        assert!(FetchError::HttpStatus(500).counts_as_failure());
        assert!(FetchError::Format(String::new()).counts_as_failure());
    }

    #[test]
    fn test_from_elapsed() {
        let err: FetchError = Elapsed(Duration::from_millis(8000)).into();
        assert_eq!(err, FetchError::Timeout { after_ms: 8000 });
        assert_eq!(err.to_string(), "request timed out after 8000 ms");
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::HttpStatus(502).to_string(), "HTTP 502");
    }
}
