use clap::Parser;
use pickwatch_core::context::AppConfig;
use pickwatch_core::overlay::{EngineConfig, OverlayEngine, OverlayUpdate};
use pickwatch_core::ratings::{CachedRatings, RatingsCache, RatingsProvider, SetRatings};
use pickwatch_core::{OverlayError, PoolAnalyzer};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Live draft pick guidance from the game log")]
struct Cli {
    /// Game log to follow. Defaults to the configured or platform path.
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Set ratings file (JSON).
    #[arg(short, long)]
    ratings: Option<PathBuf>,

    /// Skip replaying the existing log at startup.
    #[arg(long)]
    no_resume: bool,

    #[arg(long)]
    poll_ms: Option<u64>,

    #[arg(long)]
    lookback_hours: Option<u32>,

    #[arg(long)]
    debug: bool,

    /// Number of picks in each shortlist.
    #[arg(long)]
    top: Option<usize>,
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("PICKWATCH_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    // stdout carries updates
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints each update as one JSON line.
fn print_update(update: OverlayUpdate) {
    match serde_json::to_string(&update) {
        Ok(json) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{json}").and_then(|_| stdout.flush()) {
                tracing::warn!(error = %e, "Failed to write update");
            }
        }
        Err(e) => tracing::warn!(kind = ?update.kind(), error = %e, "Failed to encode update"),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();
    init_logging(cli.debug || config.overlay.debug);

    if let Some(log) = cli.log {
        config.overlay.log_path = Some(log);
    }
    if let Some(ratings) = cli.ratings {
        config.ratings_path = Some(ratings);
    }
    if cli.no_resume {
        config.overlay.resume_enabled = false;
    }
    if let Some(ms) = cli.poll_ms {
        config.overlay.poll_interval_ms = ms;
    }
    if let Some(hours) = cli.lookback_hours {
        config.overlay.lookback_hours = hours;
    }
    if let Some(top) = cli.top {
        config.overlay.top_n = top;
    }

    let settings = &config.overlay;
    let log_path = config
        .log_path()
        .ok_or("no log path configured and no platform default found")?;
    let ratings_path = config
        .ratings_path
        .clone()
        .ok_or("no ratings file given (use --ratings)")?;

    let set = SetRatings::from_path(&ratings_path, settings.bayesian.clone())
        .map_err(|e| e.to_string())?;
    tracing::info!(
        set = %set.set_code(),
        cards = set.card_count(),
        path = %ratings_path.display(),
        "Loaded set ratings"
    );
    let ratings: Arc<dyn RatingsProvider> = if settings.cache_enabled {
        let cache = RatingsCache::new(
            Duration::from_secs(settings.cache_ttl_secs),
            settings.cache_max_size,
        );
        Arc::new(CachedRatings::new(set, cache))
    } else {
        Arc::new(set)
    };
    let analyzer = Arc::new(PoolAnalyzer::new(settings.colors.clone()));

    let mut engine = OverlayEngine::new(EngineConfig::new(&log_path, settings), ratings, analyzer);
    engine.set_update_handler(print_update);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    tracing::info!(path = %log_path.display(), "Watching game log");
    match engine.start(cancel_rx).await {
        Ok(()) | Err(OverlayError::Cancelled) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}
