//! Line classification for chart sources.
//!
//! A chart source is a short line-oriented script. The first line names the
//! song; lines carrying a difficulty marker (`LV18E`) point at one chart page.
//! Everything else is ignored.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Tier;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Level number followed by a single difficulty code: "LV10N", "LV20H".
pub static DIFFICULTY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LV\d+([NAEIGHM])").unwrap());

/// Sort index lines repeat the markers but carry no chart link.
pub static SORT_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"SORT\d*").unwrap());

/// Site-relative chart page path: "/04/04011e.htm".
pub static LINK_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d.*htm").unwrap());

/// Bare chart page token without a leading path: "exhaust.htm".
pub static LINK_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\s"'<>()]+\.htm"#).unwrap());

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Tagged result of classifying one chart-source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A chart link for one tier. `url` is absolute.
    DifficultyLink { tier: Tier, url: String },
    /// The first line of the source, unparsed.
    Title(String),
    Other,
}

/// Classify line `index` of a chart source.
///
/// Line 0 is always the title line, even when it happens to contain a marker.
/// A marker line without any link token is `Other`.
pub fn classify_line(index: usize, line: &str, base_url: &str) -> LineKind {
    if index == 0 {
        return LineKind::Title(line.to_string());
    }

    if SORT_INDEX.is_match(line) {
        return LineKind::Other;
    }

    let Some(caps) = DIFFICULTY_MARKER.captures(line) else {
        return LineKind::Other;
    };

    let tier = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .and_then(Tier::from_code);

    match (tier, extract_link(line, base_url)) {
        (Some(tier), Some(url)) => LineKind::DifficultyLink { tier, url },
        _ => LineKind::Other,
    }
}

/// Find the chart page referenced by a line and resolve it against `base_url`.
pub fn extract_link(line: &str, base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');

    if let Some(m) = LINK_PATH.find(line) {
        return Some(format!("{}{}", base, m.as_str()));
    }

    // Fall back to the last bare token; sample sources name the page directly
    let token = LINK_TOKEN.find_iter(line).last()?.as_str();
    if token.starts_with("http://") || token.starts_with("https://") {
        Some(token.to_string())
    } else {
        Some(format!("{}/{}", base, token.trim_start_matches('/')))
    }
}
