//! End-to-end catalog builds against an in-memory site.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use sdvx_charts::{
    search, BuildConfig, CatalogBuilder, CatalogStore, Error, Fetcher, FixedDelay, MaxTier,
    NoRetry, Result, SearchEngine, SqliteCatalog, Translator,
};

const BASE: &str = "http://charts.test";

/// Serves fixed pages; a URL listed in `flaky` fails that many times before answering.
struct FakeSite {
    pages: HashMap<String, String>,
    flaky: RefCell<HashMap<String, u32>>,
    requests: RefCell<Vec<String>>,
}

impl FakeSite {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(path, body)| (format!("{}{}", BASE, path), body.to_string()))
                .collect(),
            flaky: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn fail_first(self, path: &str, times: u32) -> Self {
        self.flaky.borrow_mut().insert(format!("{}{}", BASE, path), times);
        self
    }

    fn request_count(&self, path: &str) -> usize {
        let url = format!("{}{}", BASE, path);
        self.requests.borrow().iter().filter(|u| **u == url).count()
    }
}

impl Fetcher for FakeSite {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());

        if let Some(remaining) = self.flaky.borrow_mut().get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::NetworkFailure {
                    url: url.to_string(),
                    message: "Connection failed: reset".to_string(),
                });
            }
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NetworkFailure {
                url: url.to_string(),
                message: "HTTP 404 error".to_string(),
            })
    }
}

struct FakeTranslator;

impl Translator for FakeTranslator {
    fn translate(&self, text: &str, _src: &str, _dest: &str) -> Result<String> {
        Ok(match text {
            "悪戯" => "Mischief".to_string(),
            "天国の階段" => "Stairway to Heaven".to_string(),
            other => other.to_string(),
        })
    }

    fn pronounce(&self, text: &str, _dest: &str) -> Result<Option<String>> {
        Ok(match text {
            "悪戯" => Some("Itazura".to_string()),
            "天国の階段" => Some("Tengoku no Kaidan".to_string()),
            _ => None,
        })
    }
}

/// Fails the first `failures` translate calls, then answers like `FakeTranslator`.
struct FlakyTranslator {
    failures: u32,
    calls: Cell<u32>,
}

impl FlakyTranslator {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: Cell::new(0),
        }
    }
}

impl Translator for FlakyTranslator {
    fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call <= self.failures {
            return Err(Error::TranslationFailure("rate limited (HTTP 429)".to_string()));
        }
        FakeTranslator.translate(text, src, dest)
    }

    fn pronounce(&self, text: &str, dest: &str) -> Result<Option<String>> {
        FakeTranslator.pronounce(text, dest)
    }
}

fn config(listings: &[&str]) -> BuildConfig {
    BuildConfig {
        base_url: BASE.to_string(),
        listings: listings.iter().map(|s| s.to_string()).collect(),
        retry: FixedDelay::new(3, Duration::ZERO),
    }
}

fn site() -> FakeSite {
    FakeSite::new(&[
        (
            "/sort/sort_a.js",
            "SORT_A = [];\n/04/js/04011sort.js\n/05/js/05002sort.js",
        ),
        ("/sort/sort_t.js", "/06/js/06003sort.js"),
        (
            "/04/js/04011sort.js",
            "04011 悪戯\nLV5N /04/04011n.htm\nLV12A /04/04011a.htm\nLV16E /04/04011e.htm\nLV18G /04/04011g.htm",
        ),
        (
            "/05/js/05002sort.js",
            "05002 Bangin&#39; Burst\nLV6N /05/05002n.htm\nLV13A /05/05002a.htm\nLV17E /05/05002e.htm",
        ),
        (
            "/06/js/06003sort.js",
            "06003 天国の階段\r\nLV19E /06/06003e.htm\r\nLV20M /06/06003m.htm\r\n",
        ),
    ])
}

#[test]
fn test_build_full_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));
    let site = site();

    let report = CatalogBuilder::new(&site, &FakeTranslator, config(&["/sort/sort_a.js", "/sort/sort_t.js"]))
        .rebuild(&mut store)
        .unwrap();

    assert_eq!(report.songs, 3);
    assert_eq!(report.listings, 2);
    assert_eq!(report.snapshot, None);

    let songs = store.load_songs().unwrap();
    let names: Vec<_> = songs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["悪戯", "Bangin' Burst", "天国の階段"]);

    let itazura = &songs[0];
    assert_eq!(itazura.name_romanized, "Itazura");
    assert_eq!(itazura.name_translated, "Mischief");
    assert_eq!(itazura.link_max.as_deref(), Some("http://charts.test/04/04011g.htm"));
    assert_eq!(itazura.max_tier(), Some(MaxTier::Gravity));

    let burst = &songs[1];
    assert_eq!(burst.name_romanized, "Bangin' Burst");
    assert_eq!(burst.name_rom_no_space, "Bangin'Burst");
    assert_eq!(burst.link_max, None);
    assert_eq!(burst.max_dif, 0);

    let tengoku = &songs[2];
    assert_eq!(tengoku.name_rom_no_space, "TengokunoKaidan");
    assert_eq!(tengoku.link_nov, None);
    assert_eq!(tengoku.max_dif, 4);
}

#[test]
fn test_transient_failures_are_retried() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));
    let site = site().fail_first("/04/js/04011sort.js", 2);

    let report = CatalogBuilder::new(&site, &FakeTranslator, config(&["/sort/sort_a.js"]))
        .rebuild(&mut store)
        .unwrap();

    assert_eq!(report.songs, 2);
    assert_eq!(site.request_count("/04/js/04011sort.js"), 3);
}

#[test]
fn test_failed_build_keeps_previous_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));

    CatalogBuilder::new(&site(), &FakeTranslator, config(&["/sort/sort_a.js"]))
        .rebuild(&mut store)
        .unwrap();
    let before = fs::read(store.path()).unwrap();

    // Out of attempts on the second listing's only chart
    let site = site().fail_first("/06/js/06003sort.js", 10);
    let result = CatalogBuilder::new(&site, &FakeTranslator, config(&["/sort/sort_a.js", "/sort/sort_t.js"]))
        .rebuild(&mut store);

    assert!(matches!(result, Err(Error::NetworkFailure { .. })));
    assert_eq!(site.request_count("/06/js/06003sort.js"), 3);
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert!(!store.staging_path().exists());
    assert_eq!(store.load_songs().unwrap().len(), 2);
}

#[test]
fn test_translation_failure_keeps_previous_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));

    CatalogBuilder::new(&site(), &FakeTranslator, config(&["/sort/sort_t.js"]))
        .rebuild(&mut store)
        .unwrap();
    let before = fs::read(store.path()).unwrap();

    // Only the Japanese titles reach the translator; the first one never gets through
    let translator = FlakyTranslator::new(u32::MAX);
    let result = CatalogBuilder::new(&site(), &translator, config(&["/sort/sort_a.js", "/sort/sort_t.js"]))
        .rebuild(&mut store);

    assert!(matches!(result, Err(Error::TranslationFailure(_))));
    assert_eq!(translator.calls.get(), 3);
    assert_eq!(fs::read(store.path()).unwrap(), before);
    assert!(!store.staging_path().exists());
    assert_eq!(store.load_songs().unwrap()[0].name, "天国の階段");
}

#[test]
fn test_translation_recovers_within_retry_budget() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));
    let translator = FlakyTranslator::new(2);

    let report = CatalogBuilder::new(&site(), &translator, config(&["/sort/sort_a.js"]))
        .rebuild(&mut store)
        .unwrap();

    assert_eq!(report.songs, 2);
    // Two failures and one success for 悪戯; Bangin' Burst needs no translation
    assert_eq!(translator.calls.get(), 3);
    assert_eq!(store.load_songs().unwrap()[0].name_translated, "Mischief");
}

#[test]
fn test_malformed_source_aborts_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));
    let site = FakeSite::new(&[
        ("/sort/sort_a.js", "/07/js/07001sort.js"),
        ("/07/js/07001sort.js", "garbage without an id\nLV5N /07/07001n.htm"),
    ]);

    let single_attempt = BuildConfig {
        base_url: BASE.to_string(),
        listings: vec!["/sort/sort_a.js".to_string()],
        retry: NoRetry::new(),
    };
    let result = CatalogBuilder::new(&site, &FakeTranslator, single_attempt).rebuild(&mut store);

    assert!(matches!(result, Err(Error::MalformedSource(_))));
    assert_eq!(site.request_count("/07/js/07001sort.js"), 1);
    assert!(!store.path().exists());
}

#[test]
fn test_rebuild_snapshots_previous_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteCatalog::new(dir.path().join("sdvxCharts.db"));

    CatalogBuilder::new(&site(), &FakeTranslator, config(&["/sort/sort_t.js"]))
        .rebuild(&mut store)
        .unwrap();
    let before = fs::read(store.path()).unwrap();

    let report = CatalogBuilder::new(&site(), &FakeTranslator, config(&["/sort/sort_a.js", "/sort/sort_t.js"]))
        .rebuild(&mut store)
        .unwrap();

    let snapshot = report.snapshot.unwrap();
    assert_eq!(fs::read(&snapshot).unwrap(), before);
    assert_eq!(store.load_songs().unwrap().len(), 3);
}

#[test]
fn test_search_built_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sdvxCharts.db");
    let mut store = SqliteCatalog::new(&path);

    CatalogBuilder::new(&site(), &FakeTranslator, config(&["/sort/sort_a.js", "/sort/sort_t.js"]))
        .rebuild(&mut store)
        .unwrap();

    let engine = SearchEngine::new(SqliteCatalog::new(&path));

    let results = engine.search("stairway to heaven").unwrap();
    assert_eq!(results.score, 100);
    assert_eq!(results.songs.len(), 1);
    assert_eq!(results.songs[0].name, "天国の階段");

    let results = engine.search("悪戯").unwrap();
    assert_eq!(results.score, 100);
    assert_eq!(results.songs[0].name_translated, "Mischief");

    let results = engine.search("tengokunokaidan").unwrap();
    assert_eq!(results.songs[0].name, "天国の階段");

    let catalog = store.load_songs().unwrap();
    assert_eq!(search("itazura", &catalog).songs[0].name, "悪戯");
}

#[test]
fn test_search_missing_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let engine = SearchEngine::new(SqliteCatalog::new(dir.path().join("nothing.db")));
    assert!(matches!(engine.search("anything"), Err(Error::CatalogNotFound(_))));
}
