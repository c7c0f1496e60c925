//! Expiring Cache - command-line fetcher
//!
//! Fetches JSON paths from a backend through the memoizing fetcher so that
//! cache hits, misses, and expiry can be observed.

use anyhow::{bail, Context};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{CachedFetcher, Config, RequestOptions, Sweeper};

/// Fetch JSON through an expiring in-memory cache
#[derive(Parser, Debug)]
#[command(name = "expiring_cache")]
#[command(about = "Fetch JSON endpoints through an expiring in-memory cache")]
#[command(version)]
struct Cli {
    /// Paths (or absolute URLs) to fetch
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<String>,

    /// Backend base URL [env: BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Default TTL in milliseconds [env: DEFAULT_TTL_MS]
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Sweep interval in seconds [env: SWEEP_INTERVAL_SECS]
    #[arg(long)]
    sweep_secs: Option<u64>,

    /// How many times to fetch each path
    #[arg(long, default_value_t = 2)]
    repeat: u32,

    /// Query parameter added to every request, as NAME=VALUE
    #[arg(long = "query", value_name = "NAME=VALUE", value_parser = parse_pair)]
    query: Vec<(String, String)>,
}

fn parse_pair(s: &str) -> anyhow::Result<(String, String)> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("expected NAME=VALUE, got '{}'", s),
    }
}

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables, then apply CLI overrides
/// 3. Create the cache and start the background sweep task
/// 4. Fetch every path `repeat` times, printing where each body came from
/// 5. Stop the sweep task on completion or Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(ttl_ms) = cli.ttl_ms {
        config.default_ttl_ms = ttl_ms;
    }
    if let Some(sweep_secs) = cli.sweep_secs {
        config.sweep_interval_secs = sweep_secs;
    }
    info!(
        "Configuration loaded: default_ttl={}ms, sweep_interval={}s, base_url={}",
        config.default_ttl_ms, config.sweep_interval_secs, config.base_url
    );

    let fetcher = CachedFetcher::from_config(&config).context("failed to create HTTP client")?;
    let cache = fetcher.cache().clone();
    let sweeper = Sweeper::start(cache.clone(), config.sweep_interval());

    let options = cli
        .query
        .into_iter()
        .fold(RequestOptions::new(), |options, (name, value)| {
            options.with_query(name, value)
        });

    let run = async {
        for path in &cli.paths {
            for _ in 0..cli.repeat {
                let fetched = fetcher
                    .fetch(path, &options)
                    .await
                    .with_context(|| format!("failed to fetch {}", path))?;
                println!(
                    "[{}] {} (fetched {}) {}",
                    fetched.origin,
                    path,
                    fetched.fetched_at.to_rfc3339(),
                    fetched.body
                );
            }
        }
        anyhow::Ok(())
    };

    let result = tokio::select! {
        result = run => result,
        _ = signal::ctrl_c() => {
            warn!("Received Ctrl+C, stopping");
            Ok(())
        }
    };

    sweeper.stop().await;

    let stats = cache.stats();
    info!(
        "Cache stats: hits={}, misses={}, expirations={}, entries={}, hit_rate={:.2}",
        stats.hits,
        stats.misses,
        stats.expirations,
        stats.total_entries,
        stats.hit_rate()
    );

    result
}
