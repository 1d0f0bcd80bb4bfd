//! Translation collaborator.
//!
//! The normalizer needs two things from a translation service: a translation
//! of a title, and a pronunciation guide in the title's own script. Both are
//! network calls that can fail or be rate limited.

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::translation;
use crate::error::{Error, Result};

/// Capability the normalizer delegates to.
pub trait Translator {
    /// Translate `text` from `src` into `dest`.
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String>;

    /// Pronunciation guide for `text` when rendered into `dest`.
    /// `Ok(None)` when the service returned no pronunciation.
    fn pronounce(&self, text: &str, dest: &str) -> Result<Option<String>>;
}

/// Translator backed by the public Google translate endpoint.
pub struct GoogleTranslator {
    agent: ureq::Agent,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self::with_endpoint(translation::ENDPOINT, translation::TIMEOUT)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint: endpoint.to_string(),
        }
    }

    fn request(&self, text: &str, src: &str, dest: &str) -> Result<Value> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("client", "gtx")
            .query("sl", src)
            .query("tl", dest)
            .query("dt", "t")
            .query("dt", "rm")
            .query("q", text)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(429, _) => {
                    Error::TranslationFailure("rate limited (HTTP 429)".to_string())
                }
                other => Error::TranslationFailure(other.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| Error::TranslationFailure(format!("unreadable response: {}", e)))?;
        debug!(src, dest, "translation response of {} bytes", body.len());
        decode_response(&body)
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        let payload = self.request(text, src, dest)?;
        parse_translation(&payload).ok_or_else(|| {
            Error::TranslationFailure(format!("no translation returned for {:?}", text))
        })
    }

    fn pronounce(&self, text: &str, dest: &str) -> Result<Option<String>> {
        let payload = self.request(text, "auto", dest)?;
        Ok(parse_pronunciation(&payload))
    }
}

/// Parse a response body. Rate-limit and captcha pages come back as HTML.
pub fn decode_response(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| Error::TranslationFailure(format!("bad response: {}", e)))
}

/// Join the translated sentence segments of a response.
pub fn parse_translation(payload: &Value) -> Option<String> {
    let segments = payload.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Source-script transliteration of a response.
///
/// The transliteration segment has no translated text in slot 0; slot 3 holds
/// the source reading and slot 2 the target reading.
pub fn parse_pronunciation(payload: &Value) -> Option<String> {
    let segments = payload.get(0)?.as_array()?;
    segments
        .iter()
        .filter(|seg| seg.get(0).is_some_and(Value::is_null))
        .find_map(|seg| {
            seg.get(3)
                .and_then(Value::as_str)
                .or_else(|| seg.get(2).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
}
