//! Per-attempt deadline enforcement.
//!
//! # Responsibilities
//! - Bound each network attempt with its own deadline
//! - Cancel the attempt when the deadline wins
//! - Report expiry as a distinct error kind
//!
//! The attempt and the deadline race inside `tokio::select!`. Whichever side
//! loses is dropped in place: for a reqwest future that closes the connection
//! and frees the request, so the attempt is abandoned rather than left running
//! with its result ignored.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The attempt did not settle before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {} ms", .0.as_millis())]
pub struct Elapsed(pub Duration);

/// Fixed deadline applied to one attempt at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutGuard {
    deadline: Duration,
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `attempt` against a fresh deadline.
    pub async fn run<F, T>(&self, attempt: F) -> Result<T, Elapsed>
    where
        F: Future<Output = T>,
    {
        let sleep = tokio::time::sleep(self.deadline);
        tokio::pin!(sleep);
        tokio::pin!(attempt);

        tokio::select! {
            biased;
            out = &mut attempt => Ok(out),
            _ = &mut sleep => {
                tracing::warn!(deadline_ms = self.deadline.as_millis() as u64, "Attempt deadline elapsed, cancelling");
                Err(Elapsed(self.deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Flags when the owning future is dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_attempt_passes_through() {
        let guard = TimeoutGuard::new(Duration::from_millis(8000));
        let out = guard
            .run(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                42
            })
            .await;
        assert_eq!(out, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempt_is_cancelled() {
        let guard = TimeoutGuard::new(Duration::from_millis(8000));
        let dropped = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        let flag = DropFlag(dropped.clone());
        let done = finished.clone();
        let out = guard
            .run(async move {
                let _flag = flag;
                tokio::time::sleep(Duration::from_secs(60)).await;
                done.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(out, Err(Elapsed(Duration::from_millis(8000))));
        assert!(dropped.load(Ordering::SeqCst), "in-flight attempt should be dropped");

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!finished.load(Ordering::SeqCst), "cancelled attempt must not resume");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_run_gets_fresh_deadline() {
        let guard = TimeoutGuard::new(Duration::from_millis(100));
        for _ in 0..3 {
            let out = guard
                .run(async {
                    tokio::time::sleep(Duration::from_millis(90)).await;
                })
                .await;
            assert!(out.is_ok());
        }
    }

    #[test]
    fn test_elapsed_display() {
        assert_eq!(
            Elapsed(Duration::from_millis(8000)).to_string(),
            "attempt timed out after 8000 ms"
        );
    }
}
