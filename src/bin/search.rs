use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sdvx_charts::config::database;
use sdvx_charts::{SearchEngine, SqliteCatalog};

#[derive(Parser)]
#[command(name = "sdvx-search")]
#[command(about = "Fuzzy-search the SDVX chart catalog by title")]
struct Args {
    /// Title to look for (Japanese, romanized or English)
    query: String,

    #[arg(long, env = "SDVX_CHARTS_DB", default_value = database::DEFAULT_PATH)]
    db: PathBuf,

    /// Print results as JSON
    #[arg(long, env = "SDVX_CHARTS_JSON")]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sdvx_charts=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = SearchEngine::new(SqliteCatalog::new(&args.db));
    let results = engine
        .search(&args.query)
        .with_context(|| format!("Failed to search catalog {}", args.db.display()))?;

    if args.json {
        println!("{}", results.to_json()?);
        return Ok(());
    }

    println!("Best score: {}", results.score);
    println!("{:-<80}", "");
    for song in &results.songs {
        println!("{}", song);
    }
    if results.songs.is_empty() {
        println!("No results found.");
    }

    Ok(())
}
