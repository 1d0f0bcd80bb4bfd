//! SDVX chart catalog library - shared modules for the build and search binaries.
//!
//! Scrapes the chart listing site, extracts per-song chart links and titles,
//! normalizes titles (romanization, translation), persists the catalog to
//! SQLite, and answers fuzzy title queries over it.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod retry;
pub mod safety;
pub mod scoring;
pub mod search;
pub mod store;
pub mod translate;

pub use catalog::{BuildReport, CatalogBuilder};
pub use classify::{classify_line, LineKind};
pub use config::BuildConfig;
pub use error::{Error, Result};
pub use extract::{extract_chart, extract_chart_urls};
pub use fetch::{Fetcher, HttpFetcher};
pub use models::{ChartRecord, MaxTier, NormalizedTitle, Song, Tier};
pub use normalize::normalize_title;
pub use retry::{FixedDelay, NoRetry, RetryStrategy};
pub use search::{search, SearchEngine, SearchResults};
pub use store::{CatalogStore, SqliteCatalog};
pub use translate::{GoogleTranslator, Translator};
