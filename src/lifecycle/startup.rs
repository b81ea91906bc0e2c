//! Startup sequence shared by the binaries.

use std::path::Path;

use crate::config::{load_or_default, ConfigError, FetchConfig};
use crate::observability::{logging, metrics};

/// Load config, then bring up logging and (optionally) the metrics exporter.
///
/// Must run inside a tokio runtime when metrics are enabled.
pub fn start(config_path: Option<&Path>) -> Result<FetchConfig, ConfigError> {
    let config = load_or_default(config_path)?;
    logging::init(&config.observability);

    tracing::info!(
        api_url = %config.api.url,
        cache_dir = ?config.cache.dir,
        ttl_secs = config.cache.ttl_secs,
        failure_threshold = config.breaker.failure_threshold,
        max_retries = config.retries.max_retries,
        request_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    Ok(config)
}
