//! Configuration defaults.
//!
//! Constants are grouped by concern:
//! - `site` - chart site base URL and sort listings
//! - `retry` - fixed-delay retry policy for remote calls
//! - `database` - catalog file location
//! - `translation` - translation endpoint and languages
//!
//! `BuildConfig` carries the runtime values into the catalog builder.

use std::time::Duration;

use crate::retry::FixedDelay;

/// Chart site layout.
pub mod site {
    /// Base URL that every listing and chart path is resolved against.
    pub const BASE_URL: &str = "http://sdvx.in";

    /// Sort listings, one per title initial group. Processed in this order.
    pub const SORT_LISTINGS: [&str; 10] = [
        "/sort/sort_a.js",
        "/sort/sort_k.js",
        "/sort/sort_s.js",
        "/sort/sort_t.js",
        "/sort/sort_n.js",
        "/sort/sort_h.js",
        "/sort/sort_m.js",
        "/sort/sort_y.js",
        "/sort/sort_r.js",
        "/sort/sort_w.js",
    ];
}

/// Retry policy for fetches and translation calls.
pub mod retry {
    use std::time::Duration;

    /// Maximum number of attempts per remote call.
    pub const MAX_ATTEMPTS: u32 = 7;

    /// Fixed delay between attempts.
    pub const DELAY: Duration = Duration::from_millis(500);
}

/// Catalog storage.
pub mod database {
    /// Default live catalog file.
    pub const DEFAULT_PATH: &str = "sdvxCharts.db";

    /// Suffix of the staging file a new catalog is written to before the swap.
    pub const STAGING_SUFFIX: &str = "building";

    /// chrono format appended to the file stem of a snapshot.
    pub const SNAPSHOT_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
}

/// Translation collaborator.
pub mod translation {
    use std::time::Duration;

    pub const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

    /// Language chart titles are written in.
    pub const SOURCE_LANG: &str = "ja";

    /// Language titles are translated into.
    pub const TARGET_LANG: &str = "en";

    pub const TIMEOUT: Duration = Duration::from_secs(15);
}

/// HTTP timeout for listing and chart fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings for one catalog build. `retry` wraps every remote call.
#[derive(Debug, Clone)]
pub struct BuildConfig<R = FixedDelay> {
    pub base_url: String,
    pub listings: Vec<String>,
    pub retry: R,
}

impl<R> BuildConfig<R> {
    /// Absolute URLs of every sort listing.
    pub fn listing_urls(&self) -> Vec<String> {
        self.listings
            .iter()
            .map(|path| format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .collect()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            listings: site::SORT_LISTINGS.iter().map(|s| s.to_string()).collect(),
            retry: FixedDelay::new(retry::MAX_ATTEMPTS, retry::DELAY),
        }
    }
}
