//! Catalog persistence.
//!
//! The catalog is a single SQLite file holding one `charts` table. It is
//! rebuilt wholesale: a new catalog is written to a staging file, the live file
//! is copied to a timestamped snapshot, and the staging file is renamed over the
//! live one. The live file is never opened for writing, so a failed build
//! leaves it exactly as it was.

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::database;
use crate::error::{Error, Result};
use crate::models::Song;
use crate::safety::validate_staging_path;

/// Store the builder commits to and the search engine reads from.
pub trait CatalogStore {
    /// Every song, in insertion order.
    fn load_songs(&self) -> Result<Vec<Song>>;

    /// Replace the whole catalog. Returns the snapshot of the previous catalog, if there was one.
    fn replace_songs(&mut self, songs: &[Song]) -> Result<Option<PathBuf>>;
}

const SCHEMA: &str = "
    CREATE TABLE charts (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        name_romanized TEXT NOT NULL,
        name_rom_no_space TEXT NOT NULL,
        name_translated TEXT NOT NULL,
        link_nov TEXT,
        link_adv TEXT,
        link_exh TEXT,
        link_max TEXT,
        max_dif INTEGER NOT NULL
    );";

/// SQLite-file catalog.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<catalog>.building`
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(database::STAGING_SUFFIX);
        PathBuf::from(name)
    }

    /// `<stem>-YYYY-MM-DD-HH-MM-SS.<ext>` next to the live catalog.
    pub fn snapshot_path(&self, at: DateTime<Local>) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("catalog");
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("db");
        let name = format!("{}-{}.{}", stem, at.format(database::SNAPSHOT_FORMAT), ext);
        self.path.with_file_name(name)
    }

    /// `snapshot_path(at)`, or the first free `<stem>-<timestamp>-N.<ext>` when
    /// that name is already taken by an earlier snapshot.
    pub fn free_snapshot_path(&self, at: DateTime<Local>) -> PathBuf {
        let first = self.snapshot_path(at);
        if !first.exists() {
            return first;
        }

        let stem = first
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("catalog")
            .to_string();
        let ext = first
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("db")
            .to_string();
        let mut n = 1u32;
        loop {
            let candidate = first.with_file_name(format!("{}-{}.{}", stem, n, ext));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }

    fn remove_stale_staging(&self, staging: &Path) -> Result<()> {
        if staging.exists() {
            validate_staging_path(
                staging,
                &format!(".{}", database::STAGING_SUFFIX),
                &[self.path.as_path()],
            )?;
            warn!("removing stale staging file {}", staging.display());
            fs::remove_file(staging)?;
        }
        Ok(())
    }

    fn swap_in(&self, staging: &Path) -> Result<Option<PathBuf>> {
        let snapshot = if self.path.exists() {
            let snapshot = self.free_snapshot_path(Local::now());
            fs::copy(&self.path, &snapshot)?;
            info!("previous catalog saved to {}", snapshot.display());
            Some(snapshot)
        } else {
            None
        };

        fs::rename(staging, &self.path)?;
        Ok(snapshot)
    }
}

impl CatalogStore for SqliteCatalog {
    fn load_songs(&self) -> Result<Vec<Song>> {
        if !self.path.exists() {
            return Err(Error::CatalogNotFound(self.path.clone()));
        }

        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(
            "SELECT name, name_romanized, name_rom_no_space, name_translated,
                    link_nov, link_adv, link_exh, link_max, max_dif
             FROM charts ORDER BY id",
        )?;

        let songs = stmt
            .query_map([], |row| {
                Ok(Song {
                    name: row.get(0)?,
                    name_romanized: row.get(1)?,
                    name_rom_no_space: row.get(2)?,
                    name_translated: row.get(3)?,
                    link_nov: row.get(4)?,
                    link_adv: row.get(5)?,
                    link_exh: row.get(6)?,
                    link_max: row.get(7)?,
                    max_dif: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(songs)
    }

    fn replace_songs(&mut self, songs: &[Song]) -> Result<Option<PathBuf>> {
        let staging = self.staging_path();
        self.remove_stale_staging(&staging)?;

        let result = write_catalog(&staging, songs).and_then(|()| self.swap_in(&staging));
        if result.is_err() && staging.exists() {
            if let Err(e) = fs::remove_file(&staging) {
                warn!("could not remove staging file {}: {}", staging.display(), e);
            }
        }

        if result.is_ok() {
            info!("catalog {} now holds {} songs", self.path.display(), songs.len());
        }
        result
    }
}

/// Write `songs` into a fresh catalog file in one transaction.
fn write_catalog(path: &Path, songs: &[Song]) -> Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO charts (name, name_romanized, name_rom_no_space, name_translated,
                                 link_nov, link_adv, link_exh, link_max, max_dif)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;

        for song in songs {
            stmt.execute(params![
                song.name,
                song.name_romanized,
                song.name_rom_no_space,
                song.name_translated,
                song.link_nov,
                song.link_adv,
                song.link_exh,
                song.link_max,
                song.max_dif,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}
