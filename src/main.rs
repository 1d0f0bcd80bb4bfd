use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sdvx_charts::config::{database, retry, site};
use sdvx_charts::progress::{format_duration, set_log_only};
use sdvx_charts::{
    search, BuildConfig, CatalogBuilder, CatalogStore, FixedDelay, GoogleTranslator, HttpFetcher,
    SqliteCatalog,
};

#[derive(Parser)]
#[command(name = "sdvx-charts")]
#[command(about = "Rebuild the SDVX chart catalog from the chart listing site")]
struct Args {
    /// Catalog database; the previous one is kept as a timestamped snapshot
    #[arg(long, env = "SDVX_CHARTS_DB", default_value = database::DEFAULT_PATH)]
    db: PathBuf,

    #[arg(long, env = "SDVX_CHARTS_BASE_URL", default_value = site::BASE_URL)]
    base_url: String,

    /// Attempts per remote call
    #[arg(long, env = "SDVX_CHARTS_ATTEMPTS", default_value_t = retry::MAX_ATTEMPTS)]
    attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[arg(long, env = "SDVX_CHARTS_DELAY_MS", default_value_t = retry::DELAY.as_millis() as u64)]
    delay_ms: u64,

    /// Hide progress bars and print periodic progress lines instead
    #[arg(long, env = "SDVX_CHARTS_LOG_ONLY")]
    log_only: bool,

    /// Run a search against the new catalog after building
    #[arg(long, env = "SDVX_CHARTS_TEST_QUERY")]
    test: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sdvx_charts=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    set_log_only(args.log_only);

    let config = BuildConfig {
        base_url: args.base_url,
        listings: site::SORT_LISTINGS.iter().map(|s| s.to_string()).collect(),
        retry: FixedDelay::new(args.attempts, Duration::from_millis(args.delay_ms)),
    };
    info!(
        "Retry policy: {} attempts, {:?} apart",
        args.attempts,
        config.retry.delay()
    );

    let start = Instant::now();
    let fetcher = HttpFetcher::new();
    let translator = GoogleTranslator::new();
    let mut store = SqliteCatalog::new(&args.db);

    let report = CatalogBuilder::new(&fetcher, &translator, config)
        .rebuild(&mut store)
        .with_context(|| format!("Failed to rebuild catalog {}", args.db.display()))?;

    println!("\n{:=<60}", "");
    println!("Catalog build complete!");
    println!("  Listings: {}", report.listings);
    println!("  Songs: {}", report.songs);
    if let Some(snapshot) = &report.snapshot {
        println!("  Previous catalog: {}", snapshot.display());
    }
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    if let Some(query) = args.test {
        let catalog = store.load_songs().context("Failed to read back catalog")?;
        let results = search(&query, &catalog);
        println!("\nSearch results for '{}' (score {}):", query, results.score);
        println!("{:-<80}", "");
        for song in &results.songs {
            println!("{}", song);
        }
        if results.songs.is_empty() {
            println!("No results found.");
        }
    }

    Ok(())
}
