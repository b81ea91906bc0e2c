//! Movie fetch orchestration.
//!
//! # Data Flow
//! ```text
//! get_movies()
//!     → cache read
//!         hit:   render snapshot; if stale spawn refresh, return
//!         miss:  await refresh
//!
//! refresh (single-flight)
//!     → breaker gate        (open: present "unavailable", counters untouched)
//!     → retry(timeout(GET)) (whole operation = one breaker event)
//!     → decode JSON array   (anything else is a format failure)
//!     → cache write, breaker success, render
//!     → on failure: breaker failure, present message + retry handle
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::{FileStore, MovieCache};
use crate::config::FetchConfig;
use crate::fetch::error::{FetchError, FetchResult};
use crate::http::{HttpTransport, Transport};
use crate::movies::{decode_records, Record};
use crate::observability::metrics;
use crate::render::{ErrorPresenter, Renderer, RetryHandle};
use crate::resilience::{CircuitBreaker, Clock, RetryPolicy, SystemClock, TimeoutGuard};

/// How a refresh ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh records were cached and rendered.
    Delivered { records: usize },
    /// The error was presented to the user.
    Failed(FetchError),
    /// The refresh task panicked before finishing.
    Aborted,
}

/// What `get_movies` did.
#[derive(Debug)]
pub enum MoviesOutcome {
    /// The cached snapshot was rendered. A stale snapshot also started a
    /// background refresh, whose handle is returned.
    Cached {
        stale: bool,
        refresh: Option<JoinHandle<RefreshOutcome>>,
    },
    /// Nothing was cached; the caller waited for the network.
    Fetched(RefreshOutcome),
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Fetches, caches and renders the movie collection.
pub struct MovieService {
    api_url: String,
    ttl: Duration,
    retry: RetryPolicy,
    timeout: TimeoutGuard,
    transport: Arc<dyn Transport>,
    cache: MovieCache,
    breaker: CircuitBreaker,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn Renderer>,
    presenter: Arc<dyn ErrorPresenter>,
    inflight: Mutex<Option<(u64, SharedRefresh)>>,
    generation: AtomicU64,
}

impl MovieService {
    pub fn new(
        config: &FetchConfig,
        transport: Arc<dyn Transport>,
        cache: MovieCache,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn Renderer>,
        presenter: Arc<dyn ErrorPresenter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            api_url: config.api.url.clone(),
            ttl: Duration::from_secs(config.cache.ttl_secs),
            retry: RetryPolicy::from(&config.retries),
            timeout: TimeoutGuard::new(Duration::from_millis(config.timeouts.request_ms)),
            transport,
            cache,
            breaker: CircuitBreaker::new(&config.breaker, clock.clone()),
            clock,
            renderer,
            presenter,
            inflight: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    /// Wire the production stack: reqwest transport, file-backed cache and
    /// the system clock.
    pub fn from_config(
        config: &FetchConfig,
        renderer: Arc<dyn Renderer>,
        presenter: Arc<dyn ErrorPresenter>,
    ) -> reqwest::Result<Arc<Self>> {
        let transport = Arc::new(HttpTransport::new(&config.api)?);
        let cache = MovieCache::new(Arc::new(FileStore::new(&config.cache.dir)), &config.cache.key);
        Ok(Self::new(config, transport, cache, Arc::new(SystemClock), renderer, presenter))
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn cache(&self) -> &MovieCache {
        &self.cache
    }

    /// Show movies, preferring the cached snapshot.
    ///
    /// A cached snapshot is rendered immediately and never waits on the
    /// network; if it is older than the TTL a refresh runs in the background.
    /// Without a snapshot the refresh is awaited.
    pub async fn get_movies(self: &Arc<Self>) -> MoviesOutcome {
        if let Some(entry) = self.cache.read() {
            let now = self.clock.now_ms();
            let stale = entry.is_stale(now, self.ttl);
            metrics::record_cache_read(if stale { "stale" } else { "hit" });

            self.renderer.render(&entry.payload);

            let refresh = if stale {
                tracing::info!(
                    age_ms = entry.age(now).as_millis() as u64,
                    records = entry.payload.len(),
                    "Serving stale snapshot, refreshing in background"
                );
                Some(tokio::spawn(self.shared_refresh()))
            } else {
                tracing::debug!(records = entry.payload.len(), "Serving fresh snapshot");
                None
            };
            return MoviesOutcome::Cached { stale, refresh };
        }

        metrics::record_cache_read("miss");
        MoviesOutcome::Fetched(self.shared_refresh().await)
    }

    /// Join the in-flight refresh or start one.
    ///
    /// The refresh runs in its own task, so it finishes (and frees the slot)
    /// even if every waiter is dropped. A panicking refresh resolves to
    /// `RefreshOutcome::Aborted` for its waiters.
    fn shared_refresh(self: &Arc<Self>) -> SharedRefresh {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((generation, shared)) = slot.as_ref() {
            tracing::debug!(generation, "Joining in-flight refresh");
            return shared.clone();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = InflightGuard {
            service: Arc::clone(self),
            generation,
        };
        let task = tokio::spawn(Arc::clone(self).refresh_owned(guard));
        let shared = task
            .map(|joined| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "Refresh task failed");
                    RefreshOutcome::Aborted
                }
            })
            .boxed()
            .shared();

        // The guard cannot clear the slot before this store: it takes the
        // same lock, which is held until return.
        *slot = Some((generation, shared.clone()));
        shared
    }

    async fn refresh_owned(self: Arc<Self>, _guard: InflightGuard) -> RefreshOutcome {
        self.refresh().await
    }

    async fn refresh(self: Arc<Self>) -> RefreshOutcome {
        let span = tracing::info_span!("refresh", refresh_id = %Uuid::new_v4());
        async move {
            if !self.breaker.can_attempt() {
                let err = FetchError::CircuitOpen;
                tracing::warn!("Circuit open, skipping network call");
                metrics::record_outcome(err.kind());
                self.present(&err);
                return RefreshOutcome::Failed(err);
            }

            match self.fetch_records().await {
                Ok(records) => {
                    self.store_snapshot(&records).await;
                    self.breaker.record_success();
                    metrics::record_outcome("success");
                    tracing::info!(records = records.len(), "Movies refreshed");
                    self.renderer.render(&records);
                    RefreshOutcome::Delivered {
                        records: records.len(),
                    }
                }
                Err(err) => {
                    if err.counts_as_failure() {
                        self.breaker.record_failure();
                    }
                    metrics::record_outcome(err.kind());
                    tracing::error!(
                        error = %err,
                        failure_count = self.breaker.failure_count(),
                        "Failed to fetch movies"
                    );
                    self.present(&err);
                    RefreshOutcome::Failed(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Write the snapshot on the blocking pool; the file store syncs to disk.
    /// Failure is logged and tolerated.
    async fn store_snapshot(&self, records: &[Record]) {
        let cache = self.cache.clone();
        let snapshot = records.to_vec();
        let now = self.clock.now_ms();
        match tokio::task::spawn_blocking(move || cache.write(&snapshot, now)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to update cache"),
            Err(e) => tracing::warn!(error = %e, "Cache write task failed"),
        }
    }

    async fn fetch_records(&self) -> FetchResult<Vec<Record>> {
        let body = self.retry.execute(|| self.attempt()).await?;
        decode_records(&body).map_err(|e| FetchError::Format(e.to_string()))
    }

    /// One network attempt under a fresh deadline.
    async fn attempt(&self) -> FetchResult<Vec<u8>> {
        let start = Instant::now();
        let result = match self.timeout.run(self.transport.get(&self.api_url)).await {
            Ok(result) => result,
            Err(elapsed) => Err(elapsed.into()),
        };
        metrics::record_attempt(start, result.is_ok());
        result
    }

    fn present(self: &Arc<Self>, err: &FetchError) {
        self.presenter.present_error(err.user_message(), self.retry_handle());
    }

    /// Handle that re-runs `get_movies`. Holds a weak reference so a
    /// presenter keeping it does not keep the service alive.
    pub fn retry_handle(self: &Arc<Self>) -> RetryHandle {
        let service = Arc::downgrade(self);
        RetryHandle::new(move || {
            let service = service.clone();
            async move {
                if let Some(service) = service.upgrade() {
                    tracing::info!("Retry requested");
                    if let MoviesOutcome::Cached { refresh: Some(handle), .. } = service.get_movies().await {
                        if let Err(e) = handle.await {
                            tracing::error!(error = %e, "Background refresh task failed");
                        }
                    }
                }
            }
            .boxed()
        })
    }
}

/// Releases the single-flight slot when the refresh task ends, however it ends.
struct InflightGuard {
    service: Arc<MovieService>,
    generation: u64,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let mut slot = self.service.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(slot.as_ref(), Some((g, _)) if *g == self.generation) {
            *slot = None;
        }
    }
}

impl std::fmt::Debug for MovieService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieService")
            .field("api_url", &self.api_url)
            .field("ttl", &self.ttl)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("breaker", &self.breaker)
            .field("cache", &self.cache)
            .finish()
    }
}
