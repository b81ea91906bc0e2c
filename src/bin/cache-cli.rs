use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use movie_fetch::cache::{FileStore, MovieCache};
use movie_fetch::lifecycle::startup;
use movie_fetch::resilience::{Clock, SystemClock};

#[derive(Parser)]
#[command(name = "cache-cli")]
#[command(about = "Inspect the cached movie snapshot", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the snapshot: record count, age and staleness
    Status,
    /// Print the cached records
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::start(cli.config.as_deref())?;

    let store = FileStore::new(&config.cache.dir);
    let path = store.path_for(&config.cache.key);
    let cache = MovieCache::new(Arc::new(store), &config.cache.key);
    let ttl = Duration::from_secs(config.cache.ttl_secs);

    let Some(entry) = cache.read() else {
        eprintln!("No usable snapshot at {}", path.display());
        return Ok(());
    };

    let output = match cli.command {
        Commands::Status => {
            let now = SystemClock.now_ms();
            json!({
                "path": path.display().to_string(),
                "records": entry.payload.len(),
                "stored_at": entry.stored_at,
                "age_secs": entry.age(now).as_secs(),
                "ttl_secs": ttl.as_secs(),
                "stale": entry.is_stale(now, ttl),
            })
        }
        Commands::Show => serde_json::to_value(&entry.payload)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
