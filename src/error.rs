use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Network failure fetching {url}: {message}")]
    NetworkFailure { url: String, message: String },

    #[error("Malformed chart source: {0}")]
    MalformedSource(String),

    #[error("Translation failed: {0}")]
    TranslationFailure(String),

    #[error("Catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("Safety check failed: {0}")]
    UnsafePath(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a network failure from a `ureq` error, keeping the status code when there is one.
    pub fn from_ureq(url: &str, e: ureq::Error) -> Self {
        let message = match e {
            ureq::Error::Status(code, _) => format!("HTTP {} error", code),
            ureq::Error::Transport(transport) => {
                let text = transport.to_string();
                if text.to_ascii_lowercase().contains("timed out") {
                    format!("Request timed out: {}", text)
                } else {
                    format!("Connection failed: {}", text)
                }
            }
        };
        Error::NetworkFailure {
            url: url.to_string(),
            message,
        }
    }

    /// Failures worth another attempt: the remote side may answer next time.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::NetworkFailure { .. } | Error::TranslationFailure(_)
        )
    }
}
