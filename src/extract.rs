//! Chart and listing extraction.
//!
//! Turns the text of a sort listing into chart-source URLs, and the text of a
//! chart source into a `ChartRecord`. Both are pure; fetching is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::classify::{classify_line, LineKind};
use crate::error::{Error, Result};
use crate::models::{ChartRecord, Tier};

/// Title line: site id, whitespace, display title.
pub static TITLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s+(.+)").unwrap());

/// Chart-source script path inside a sort listing: "/04/js/04011sort.js".
pub static CHART_SOURCE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d.*js").unwrap());

/// Collect chart-source URLs from a sort listing, in listing order.
pub fn extract_chart_urls(listing: &str, base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let mut urls = Vec::new();

    for line in listing.lines() {
        match CHART_SOURCE_PATH.find(line) {
            Some(m) => urls.push(format!("{}{}", base, m.as_str())),
            None => debug!("listing line without chart path: {}", line),
        }
    }

    urls
}

/// Decode the display title from a title line, resolving HTML entities.
pub fn decode_title(line: &str) -> Option<String> {
    let caps = TITLE_LINE.captures(line)?;
    let raw = caps.get(2)?.as_str().trim_end();
    Some(html_escape::decode_html_entities(raw).into_owned())
}

/// Extract one chart source into a record.
///
/// Later lines for the same tier overwrite earlier ones. A source whose first
/// line carries no title is malformed.
pub fn extract_chart(source: &str, base_url: &str) -> Result<ChartRecord> {
    let mut record = ChartRecord::default();
    let mut title = None;

    for (i, line) in source.lines().enumerate() {
        match classify_line(i, line, base_url) {
            LineKind::Title(text) => title = decode_title(&text),
            LineKind::DifficultyLink { tier, url } => match tier {
                Tier::Novice => record.link_nov = Some(url),
                Tier::Advanced => record.link_adv = Some(url),
                Tier::Exhaust => record.link_exh = Some(url),
                Tier::Max(max) => {
                    record.link_max = Some(url);
                    record.max_tier = Some(max);
                }
            },
            LineKind::Other => {}
        }
    }

    record.title = title.ok_or_else(|| {
        let first = source.lines().next().unwrap_or("");
        Error::MalformedSource(format!("no title on first line {:?}", first))
    })?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaxTier;

    const BASE: &str = "http://sdvx.in";

    #[test]
    fn test_extract_sample_chart() {
        let source = "5 Test Song\nLV10N novice.htm\nLV15A advanced.htm\nLV18E exhaust.htm\nLV20H max.htm";
        let record = extract_chart(source, BASE).unwrap();

        assert_eq!(record.title, "Test Song");
        assert!(record.link_nov.as_deref().unwrap().ends_with("novice.htm"));
        assert!(record.link_adv.as_deref().unwrap().ends_with("advanced.htm"));
        assert!(record.link_exh.as_deref().unwrap().ends_with("exhaust.htm"));
        assert!(record.link_max.as_deref().unwrap().ends_with("max.htm"));
        assert_eq!(record.max_dif(), 3);
    }

    #[test]
    fn test_max_ordinal_independent_of_order() {
        let orders = [
            ["LV17I i.htm", "LV18G g.htm", "LV19H h.htm", "LV20M m.htm"],
            ["LV20M m.htm", "LV19H h.htm", "LV18G g.htm", "LV17I i.htm"],
        ];
        for lines in orders {
            for line in lines {
                let source = format!("1 Song\n{}", line);
                let record = extract_chart(&source, BASE).unwrap();
                let expected = match line.chars().nth(4) {
                    Some('I') => 1,
                    Some('G') => 2,
                    Some('H') => 3,
                    Some('M') => 4,
                    _ => unreachable!(),
                };
                assert_eq!(record.max_dif(), expected, "line {}", line);
            }
        }
    }

    #[test]
    fn test_last_line_wins_per_tier() {
        let source = "1 Song\nLV15A first.htm\nLV16A second.htm\nLV18G g.htm\nLV20M m.htm";
        let record = extract_chart(source, BASE).unwrap();
        assert_eq!(record.link_adv.as_deref(), Some("http://sdvx.in/second.htm"));
        assert_eq!(record.max_tier, Some(MaxTier::Maximum));
        assert_eq!(record.max_dif(), 4);
    }

    #[test]
    fn test_missing_max_tier() {
        let source = "1 Song\nLV5N n.htm";
        let record = extract_chart(source, BASE).unwrap();
        assert_eq!(record.link_max, None);
        assert_eq!(record.max_dif(), 0);
    }

    #[test]
    fn test_html_entities_decoded() {
        let source = "04011 Tom &amp; Jerry&#39;s &quot;Song&quot;\nLV5N n.htm";
        let record = extract_chart(source, BASE).unwrap();
        assert_eq!(record.title, "Tom & Jerry's \"Song\"");
    }

    #[test]
    fn test_japanese_title() {
        let source = "04011 悪戯\r\nLV18E /04/04011e.htm\r\n";
        let record = extract_chart(source, BASE).unwrap();
        assert_eq!(record.title, "悪戯");
        assert_eq!(record.link_exh.as_deref(), Some("http://sdvx.in/04/04011e.htm"));
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let result = extract_chart("no id here\nLV5N n.htm", BASE);
        assert!(matches!(result, Err(Error::MalformedSource(_))));

        let result = extract_chart("", BASE);
        assert!(matches!(result, Err(Error::MalformedSource(_))));
    }

    #[test]
    fn test_extract_chart_urls() {
        let listing = "var a = 1;\ndocument.write('<script src=\"/04/js/04011sort.js\"></script>');\n// end\n/05/js/05001sort.js";
        let urls = extract_chart_urls(listing, BASE);
        assert_eq!(
            urls,
            vec![
                "http://sdvx.in/04/js/04011sort.js",
                "http://sdvx.in/05/js/05001sort.js",
            ]
        );
    }
}
