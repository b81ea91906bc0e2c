//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, fetches pass through
//! - Open: upstream assumed down, fetches are rejected without a network call
//! - Half-Open: the open window elapsed, the next fetch acts as a probe
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: first can_attempt() after next_attempt_at
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails (fresh next_attempt_at)
//! ```
//!
//! The breaker counts whole operations, not individual attempts: a fetch that
//! exhausts its retries is reported once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::BreakerConfig;
use crate::observability::metrics;
use crate::resilience::clock::Clock;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    fn gauge_value(self) -> f64 {
        match self {
            BreakerState::Closed => 0.0,
            BreakerState::Open => 1.0,
            BreakerState::HalfOpen => 2.0,
        }
    }
}

/// Point-in-time view of the breaker, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub failure_count: u32,
    /// Epoch milliseconds; only meaningful while open.
    pub next_attempt_at: u64,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    next_attempt_at: u64,
}

/// Consecutive-failure circuit breaker.
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_duration: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: &BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_ms();
        Self {
            failure_threshold: config.failure_threshold.max(1),
            open_duration: Duration::from_millis(config.open_duration_ms),
            clock,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                next_attempt_at: now,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is plain data; a panic mid-update cannot leave it torn.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether a new fetch may go to the network.
    ///
    /// An expired open window moves the breaker to half-open and lets this
    /// call through. A still-open window returns false without side effects.
    pub fn can_attempt(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if self.clock.now_ms() > inner.next_attempt_at {
                    inner.state = BreakerState::HalfOpen;
                    tracing::info!(
                        failure_count = inner.failure_count,
                        "Circuit breaker half-open, allowing probe"
                    );
                    metrics::record_breaker_state(BreakerState::HalfOpen.gauge_value());
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Reset to closed, from any state.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != BreakerState::Closed {
            tracing::info!(previous = ?inner.state, "Circuit breaker closed");
        }
        inner.failure_count = 0;
        inner.state = BreakerState::Closed;
        metrics::record_breaker_state(BreakerState::Closed.gauge_value());
    }

    /// Count one failed operation, opening the circuit at the threshold.
    ///
    /// A failure that lands while already open (a fetch that started before
    /// the circuit tripped) is counted but does not push the deadline out.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);

        if inner.state == BreakerState::Open {
            return;
        }

        if inner.failure_count >= self.failure_threshold {
            inner.state = BreakerState::Open;
            inner.next_attempt_at = self
                .clock
                .now_ms()
                .saturating_add(self.open_duration.as_millis() as u64);
            tracing::warn!(
                failure_count = inner.failure_count,
                open_ms = self.open_duration.as_millis() as u64,
                "Circuit breaker opened"
            );
            metrics::record_breaker_state(BreakerState::Open.gauge_value());
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            next_attempt_at: inner.next_attempt_at,
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("failure_threshold", &self.failure_threshold)
            .field("open_duration", &self.open_duration)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
