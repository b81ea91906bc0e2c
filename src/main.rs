//! Resilient movie client (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   get_movies()
//!       │
//!       ▼
//!   ┌─────────┐ hit  ┌──────────┐
//!   │  cache  │─────▶│ renderer │◀──────────────────────────┐
//!   └────┬────┘      └──────────┘                           │
//!        │ miss / stale                                     │
//!        ▼                                                  │
//!   ┌─────────┐ open ┌───────────────┐                      │
//!   │ breaker │─────▶│ error + retry │                      │
//!   └────┬────┘      └───────────────┘                      │
//!        ▼                   ▲                              │
//!   ┌──────────────────────┐ │ failure   ┌──────────────┐   │
//!   │ retry(timeout(GET))  │─┴──────────▶│ cache write  │───┘
//!   └──────────────────────┘   success   └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use movie_fetch::fetch::{MovieService, MoviesOutcome};
use movie_fetch::lifecycle::{signals, startup, Shutdown};
use movie_fetch::render::{HtmlRenderer, Renderer, Tee, TerminalView};

#[derive(Parser)]
#[command(name = "movie-fetch")]
#[command(about = "Fetch and display the movie collection", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the collection as an HTML page.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Re-run the fetch every N seconds until Ctrl-C.
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::start(cli.config.as_deref())?;

    let view = Arc::new(TerminalView::new(std::io::stdout()));
    let terminal: Arc<dyn Renderer> = view.clone();
    let renderer: Arc<dyn Renderer> = match &cli.html {
        Some(path) => {
            let html: Arc<dyn Renderer> = Arc::new(HtmlRenderer::new(path));
            Arc::new(Tee::new(vec![terminal, html]))
        }
        None => terminal,
    };
    let service = MovieService::from_config(&config, renderer, view.clone())?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_ctrl_c(shutdown.clone());
    let mut shutdown_rx = shutdown.subscribe();

    settle(service.get_movies().await).await;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let watch = cli.watch.map(Duration::from_secs);

    loop {
        if let Some(retry) = view.take_retry() {
            let tick = sleep_or_forever(watch);
            tokio::select! {
                line = stdin.next_line() => match line {
                    Ok(Some(_)) => retry.trigger().await,
                    _ => break,
                },
                _ = tick => settle(service.get_movies().await).await,
                _ = shutdown_rx.recv() => break,
            }
            continue;
        }

        let Some(interval) = watch else { break };
        tokio::select! {
            _ = tokio::time::sleep(interval) => settle(service.get_movies().await).await,
            _ = shutdown_rx.recv() => break,
        }
    }

    tracing::info!(breaker = ?service.breaker().snapshot(), "Exiting");
    Ok(())
}

/// Wait for a background refresh so its output lands before the next prompt.
async fn settle(outcome: MoviesOutcome) {
    if let MoviesOutcome::Cached { refresh: Some(handle), .. } = outcome {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Background refresh task failed");
        }
    }
}

async fn sleep_or_forever(interval: Option<Duration>) {
    match interval {
        Some(interval) => tokio::time::sleep(interval).await,
        None => std::future::pending().await,
    }
}
