//! Fuzzy catalog search.
//!
//! Queries containing Japanese characters are compared against original
//! titles only. Anything else is compared against romanized titles, then
//! space-free romanized titles, then translated titles; each pass scans the
//! whole catalog and feeds one running best score.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Result;
use crate::models::Song;
use crate::normalize::contains_japanese;
use crate::scoring::token_set_ratio;
use crate::store::CatalogStore;

/// Best-scoring songs for a query. Every song tied at `score` is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub score: u8,
    pub songs: Vec<Song>,
}

impl SearchResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Running maximum plus the catalog indexes tied at it.
struct BestMatches {
    score: u8,
    indexes: Vec<usize>,
    members: FxHashSet<usize>,
}

impl BestMatches {
    fn new() -> Self {
        Self {
            score: 0,
            indexes: Vec::new(),
            members: FxHashSet::default(),
        }
    }

    fn offer(&mut self, index: usize, score: u8) {
        if score > self.score {
            self.score = score;
            self.indexes.clear();
            self.members.clear();
            self.indexes.push(index);
            self.members.insert(index);
        } else if score == self.score && self.members.insert(index) {
            self.indexes.push(index);
        }
    }
}

fn original(song: &Song) -> &str {
    &song.name
}

fn romanized(song: &Song) -> &str {
    &song.name_romanized
}

fn romanized_no_space(song: &Song) -> &str {
    &song.name_rom_no_space
}

fn translated(song: &Song) -> &str {
    &song.name_translated
}

const ORIGINAL_TIERS: [fn(&Song) -> &str; 1] = [original];
const LATIN_TIERS: [fn(&Song) -> &str; 3] = [romanized, romanized_no_space, translated];

/// Search `catalog` for `query`. Empty only when the catalog is empty.
pub fn search(query: &str, catalog: &[Song]) -> SearchResults {
    let mut best = BestMatches::new();

    let tiers: &[fn(&Song) -> &str] = if contains_japanese(query) {
        &ORIGINAL_TIERS
    } else {
        &LATIN_TIERS
    };

    for field in tiers {
        for (i, song) in catalog.iter().enumerate() {
            best.offer(i, token_set_ratio(field(song), query));
        }
    }

    SearchResults {
        score: best.score,
        songs: best.indexes.into_iter().map(|i| catalog[i].clone()).collect(),
    }
}

/// Search over an injected catalog store.
pub struct SearchEngine<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> SearchEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the catalog and search it. The store must not be rebuilt concurrently.
    pub fn search(&self, query: &str) -> Result<SearchResults> {
        let catalog = self.store.load_songs()?;
        Ok(search(query, &catalog))
    }
}
