//! String similarity scoring for catalog search.
//!
//! This module contains the token-set ratio used to rank songs against a query:
//! - Text preprocessing (case folding, punctuation to whitespace)
//! - Pairwise indel ratio
//! - Token-set comparison

use std::collections::BTreeSet;

// ============================================================================
// Preprocessing
// ============================================================================

/// Lowercase, turn every non-alphanumeric character into a space, trim.
/// Unicode letters and digits are kept so Japanese titles still tokenize.
pub fn preprocess(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.to_lowercase().trim().to_string()
}

// ============================================================================
// Ratios
// ============================================================================

/// Length of the longest common subsequence of two char sequences.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

/// Indel similarity of two strings as an integer percentage (0-100).
///
/// Insertions and deletions cost 1 and substitutions 2, so the score is
/// `2 * lcs / (len_a + len_b)`. Halves round to even. Either side empty scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let numer = 200 * lcs_len(&a, &b);
    let denom = a.len() + b.len();
    let (q, r) = (numer / denom, numer % denom);
    let rounded = match (2 * r).cmp(&denom) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
        std::cmp::Ordering::Less => q,
    };
    rounded as u8
}

/// Token-set ratio (0-100).
///
/// Compares the sorted intersection of the two word sets with each side's
/// intersection-plus-remainder, and the two remainders' combinations with each
/// other; the best of the three wins. Word order, repeated words and
/// subset/superset relationships do not lower the score.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = preprocess(a);
    let b = preprocess(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let intersection = join(tokens_a.intersection(&tokens_b).copied());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied());

    let combined_ab = format!("{} {}", intersection, diff_ab).trim().to_string();
    let combined_ba = format!("{} {}", intersection, diff_ba).trim().to_string();

    ratio(&intersection, &combined_ab)
        .max(ratio(&intersection, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}
