//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and the endpoint URL.
//! Every problem is reported, not just the first.

use url::Url;

use crate::config::schema::FetchConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FetchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.url", e.to_string())),
    }

    if config.cache.key.trim().is_empty() {
        errors.push(ValidationError::new("cache.key", "must not be empty"));
    }
    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::new("cache.ttl_secs", "must be greater than 0"));
    }

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::new("breaker.failure_threshold", "must be at least 1"));
    }
    if config.breaker.open_duration_ms == 0 {
        errors.push(ValidationError::new("breaker.open_duration_ms", "must be greater than 0"));
    }

    if config.retries.initial_delay_ms == 0 {
        errors.push(ValidationError::new("retries.initial_delay_ms", "must be greater than 0"));
    }
    if let Some(max) = config.retries.max_delay_ms {
        if max < config.retries.initial_delay_ms {
            errors.push(ValidationError::new(
                "retries.max_delay_ms",
                "must not be lower than initial_delay_ms",
            ));
        }
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::new("timeouts.request_ms", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
