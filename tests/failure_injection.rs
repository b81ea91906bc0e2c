//! Failure injection tests against a live mock backend.

use std::sync::atomic::Ordering;
use std::time::Duration;

use movie_fetch::cache::KvStore;
use movie_fetch::resilience::BreakerState;
use movie_fetch::{FetchError, MoviesOutcome, RefreshOutcome};

mod common;

#[tokio::test]
async fn test_retry_on_failure() {
    let (addr, hits) = common::start_programmable_backend(|n| async move {
        if n < 2 {
            (503, "Service Unavailable".to_string())
        } else {
            (200, common::MOVIES.to_string())
        }
    })
    .await;

    let config = common::test_config(addr);
    let (service, view, _store) = common::service(&config);

    match service.get_movies().await {
        MoviesOutcome::Fetched(RefreshOutcome::Delivered { records }) => assert_eq!(records, 2),
        other => panic!("expected delivery, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(view.render_count(), 1);
    assert!(view.last_error().is_none());
    assert_eq!(service.breaker().failure_count(), 0);
}

#[tokio::test]
async fn test_exhausted_retries_show_server_error() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { (500, "boom".to_string()) }).await;

    let config = common::test_config(addr);
    let (service, view, _store) = common::service(&config);

    let outcome = service.get_movies().await;
    assert!(matches!(
        outcome,
        MoviesOutcome::Fetched(RefreshOutcome::Failed(FetchError::HttpStatus(500)))
    ));
    // One initial attempt plus three retries.
    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(view.last_error().as_deref(), Some("server error. please try later."));
    assert_eq!(view.render_count(), 0);
    assert_eq!(service.breaker().failure_count(), 1);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let (addr, hits) =
        common::start_programmable_backend(|_| common::slow(1_000, 200, common::MOVIES)).await;

    let mut config = common::test_config(addr);
    config.timeouts.request_ms = 100;
    config.retries.max_retries = 1;
    let (service, view, _store) = common::service(&config);

    let outcome = service.get_movies().await;
    assert!(matches!(
        outcome,
        MoviesOutcome::Fetched(RefreshOutcome::Failed(FetchError::Timeout { after_ms: 100 }))
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(view.last_error().as_deref(), Some("request timed out. please try again."));
    assert_eq!(service.breaker().failure_count(), 1);
}

#[tokio::test]
async fn test_unreachable_backend_reports_network_error() {
    let addr = common::dead_address().await;
    let mut config = common::test_config(addr);
    config.retries.max_retries = 1;
    let (service, view, _store) = common::service(&config);

    let outcome = service.get_movies().await;
    assert!(matches!(
        outcome,
        MoviesOutcome::Fetched(RefreshOutcome::Failed(FetchError::Network(_)))
    ));
    assert_eq!(view.last_error().as_deref(), Some("network error. check your connection."));
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { (200, r#"{"movies": []}"#.to_string()) })
            .await;

    let config = common::test_config(addr);
    let (service, view, store) = common::service(&config);

    let outcome = service.get_movies().await;
    assert!(matches!(
        outcome,
        MoviesOutcome::Fetched(RefreshOutcome::Failed(FetchError::Format(_)))
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(view.last_error().as_deref(), Some("unable to load movies."));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_circuit_opens_and_stops_traffic() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { (502, "bad gateway".to_string()) }).await;

    let mut config = common::test_config(addr);
    config.breaker.failure_threshold = 2;
    config.retries.max_retries = 0;
    let (service, view, _store) = common::service(&config);

    service.get_movies().await;
    service.get_movies().await;
    assert_eq!(service.breaker().state(), BreakerState::Open);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let outcome = service.get_movies().await;
    assert!(matches!(
        outcome,
        MoviesOutcome::Fetched(RefreshOutcome::Failed(FetchError::CircuitOpen))
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 2, "open circuit must not reach the backend");
    assert_eq!(
        view.last_error().as_deref(),
        Some("service temporarily unavailable. please try again later.")
    );
    assert_eq!(service.breaker().failure_count(), 2);
}

#[tokio::test]
async fn test_stale_snapshot_served_then_refreshed() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { (200, common::MOVIES.to_string()) }).await;

    let config = common::test_config(addr);
    let (service, view, store) = common::service(&config);
    store
        .put(
            &config.cache.key,
            br#"{"data":[{"id":9,"title":"Old"}],"timestamp":0}"#,
        )
        .unwrap();

    let refresh = match service.get_movies().await {
        MoviesOutcome::Cached { stale: true, refresh: Some(handle) } => handle,
        other => panic!("expected stale hit, got {:?}", other),
    };
    // The stale snapshot is on screen before the network answers.
    assert_eq!(view.renders.lock().unwrap()[0][0].title.as_deref(), Some("Old"));

    assert_eq!(refresh.await.unwrap(), RefreshOutcome::Delivered { records: 2 });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(view.render_count(), 2);

    let entry = service.cache().read().unwrap();
    assert_eq!(entry.payload.len(), 2);
    assert!(entry.stored_at > 0);

    match service.get_movies().await {
        MoviesOutcome::Cached { stale: false, refresh: None } => {}
        other => panic!("expected fresh hit, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_handle_recovers() {
    let (addr, hits) = common::start_programmable_backend(|n| async move {
        if n == 0 {
            (500, "boom".to_string())
        } else {
            (200, common::MOVIES.to_string())
        }
    })
    .await;

    let mut config = common::test_config(addr);
    config.retries.max_retries = 0;
    let (service, view, _store) = common::service(&config);

    service.get_movies().await;
    assert_eq!(view.render_count(), 0);

    let retry = view.retry.lock().unwrap().take().unwrap();
    tokio::time::timeout(Duration::from_secs(5), retry.trigger())
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(view.render_count(), 1);
    assert_eq!(service.breaker().failure_count(), 0);
}
