//! Catalog building.
//!
//! Fetches every sort listing, then every chart source a listing names,
//! extracts and normalizes each chart, and commits the full song list to the
//! store in one replacement. Any failure aborts the build before the store is
//! touched, so a partial catalog is never committed.

use std::time::Instant;
use tracing::{error, info};

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_chart, extract_chart_urls};
use crate::fetch::Fetcher;
use crate::models::Song;
use crate::normalize::normalize_title;
use crate::progress::{commit_spinner, format_duration, ListingProgress};
use crate::retry::{FixedDelay, RetryStrategy};
use crate::store::CatalogStore;
use crate::translate::Translator;

/// Summary of a committed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub songs: usize,
    pub listings: usize,
    pub snapshot: Option<std::path::PathBuf>,
}

/// Drives extraction and normalization over the whole site.
pub struct CatalogBuilder<'a, F: ?Sized, T: ?Sized, R = FixedDelay> {
    fetcher: &'a F,
    translator: &'a T,
    config: BuildConfig<R>,
}

impl<'a, F, T, R> CatalogBuilder<'a, F, T, R>
where
    F: Fetcher + ?Sized,
    T: Translator + ?Sized,
    R: RetryStrategy,
{
    pub fn new(fetcher: &'a F, translator: &'a T, config: BuildConfig<R>) -> Self {
        Self {
            fetcher,
            translator,
            config,
        }
    }

    /// Fetch with the configured retry policy.
    fn fetch(&self, url: &str) -> Result<String> {
        self.config
            .retry
            .execute_if(|_| self.fetcher.fetch_text(url), Error::is_transient)
            .inspect_err(|e| error!(url, "giving up: {}", e))
    }

    /// Build one song from a chart source URL.
    pub fn build_song(&self, url: &str) -> Result<Song> {
        let source = self.fetch(url)?;
        let record = extract_chart(&source, &self.config.base_url)
            .inspect_err(|e| error!(url, "{}", e))?;
        let title = self
            .config
            .retry
            .execute_if(
                |_| normalize_title(&record.title, self.translator),
                Error::is_transient,
            )
            .inspect_err(|e| error!(url, "{}", e))?;
        Ok(Song::from_parts(record, title))
    }

    /// Collect every song of the site, in listing order.
    pub fn collect_songs(&self) -> Result<Vec<Song>> {
        let mut songs = Vec::new();

        for listing_url in self.config.listing_urls() {
            info!("Parsing {}", listing_url);
            let listing = self.fetch(&listing_url)?;
            let chart_urls = extract_chart_urls(&listing, &self.config.base_url);

            let mut progress = ListingProgress::new(&listing_url, chart_urls.len() as u64);
            for chart_url in &chart_urls {
                match self.build_song(chart_url) {
                    Ok(song) => songs.push(song),
                    Err(e) => {
                        progress.abandon();
                        return Err(e);
                    }
                }
                progress.advance();
            }
            progress.finish();
        }

        Ok(songs)
    }

    /// Rebuild the catalog in `store`. On failure the store keeps its previous catalog.
    pub fn rebuild<S: CatalogStore + ?Sized>(&self, store: &mut S) -> Result<BuildReport> {
        let start = Instant::now();
        info!("Starting catalog build");

        let songs = match self.collect_songs() {
            Ok(songs) => songs,
            Err(e) => {
                error!("build aborted, previous catalog kept: {}", e);
                return Err(e);
            }
        };

        let spinner = commit_spinner(songs.len());
        let snapshot = match store.replace_songs(&songs) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                spinner.abandon();
                error!("commit failed, previous catalog kept: {}", e);
                return Err(e);
            }
        };
        spinner.finish_with_message(format!("Committed {} songs", songs.len()));

        info!(
            "Catalog built: {} songs in {}",
            songs.len(),
            format_duration(start.elapsed())
        );

        Ok(BuildReport {
            songs: songs.len(),
            listings: self.config.listings.len(),
            snapshot,
        })
    }
}
