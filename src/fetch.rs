//! Remote text fetching.

use std::time::Duration;
use tracing::debug;

use crate::config::FETCH_TIMEOUT;
use crate::error::{Error, Result};

/// Fetch a text resource by URL. Implementations block until a response or timeout.
pub trait Fetcher {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(timeout)
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "fetching");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| Error::from_ureq(url, e))?;

        response.into_string().map_err(|e| Error::NetworkFailure {
            url: url.to_string(),
            message: format!("failed reading body: {}", e),
        })
    }
}
