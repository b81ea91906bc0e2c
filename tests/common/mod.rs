//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use movie_fetch::cache::{MemoryStore, MovieCache};
use movie_fetch::config::FetchConfig;
use movie_fetch::http::HttpTransport;
use movie_fetch::render::{ErrorPresenter, Renderer, RetryHandle};
use movie_fetch::resilience::SystemClock;
use movie_fetch::{MovieService, Record};

pub const MOVIES: &str = r#"[
    {"id": 1, "title": "Alien", "year": 1979, "genre": "Horror", "stars": 5, "image_url": "https://img.example/alien.jpg"},
    {"id": 2, "title": "Heat", "year": "1995", "genre": "Crime", "stars": 4.5}
]"#;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the zero-based request number and returns the status and
/// body to send. Returns the bound address and a request counter.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<AtomicU32>)
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 2048];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f(n).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}

/// An address with nothing listening on it.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at `addr` with test-friendly timings.
pub fn test_config(addr: SocketAddr) -> FetchConfig {
    let mut config = FetchConfig::default();
    config.api.url = format!("http://{}/api-movies", addr);
    config.retries.initial_delay_ms = 10;
    config.timeouts.request_ms = 500;
    config
}

/// Records everything shown to the user.
#[derive(Default)]
pub struct RecordingView {
    pub renders: Mutex<Vec<Vec<Record>>>,
    pub errors: Mutex<Vec<String>>,
    pub retry: Mutex<Option<RetryHandle>>,
}

impl RecordingView {
    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingView {
    fn render(&self, movies: &[Record]) {
        self.renders.lock().unwrap().push(movies.to_vec());
    }
}

impl ErrorPresenter for RecordingView {
    fn present_error(&self, message: &str, retry: RetryHandle) {
        self.errors.lock().unwrap().push(message.to_string());
        *self.retry.lock().unwrap() = Some(retry);
    }
}

/// Service over the real HTTP transport with an in-memory cache.
pub fn service(config: &FetchConfig) -> (Arc<MovieService>, Arc<RecordingView>, MemoryStore) {
    let view = Arc::new(RecordingView::default());
    let store = MemoryStore::new();
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let transport = HttpTransport::with_client(client);
    let service = MovieService::new(
        config,
        Arc::new(transport),
        MovieCache::new(Arc::new(store.clone()), config.cache.key.clone()),
        Arc::new(SystemClock),
        view.clone(),
        view.clone(),
    );
    (service, view, store)
}

pub async fn slow(ms: u64, status: u16, body: &str) -> (u16, String) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    (status, body.to_string())
}
