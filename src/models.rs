//! Core data models for the chart catalog.
//!
//! This module contains the difficulty tiers a chart line can name, the
//! record the extractor produces for one chart source, and the `Song` read
//! model persisted in the catalog and returned by search.

use serde::Serialize;
use std::fmt;

// ============================================================================
// Difficulty Tiers
// ============================================================================

/// Sub-level of the maximum tier. The discriminant is the stored ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaxTier {
    Infinite = 1,
    Gravity = 2,
    Heavenly = 3,
    Maximum = 4,
}

impl MaxTier {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(MaxTier::Infinite),
            'G' => Some(MaxTier::Gravity),
            'H' => Some(MaxTier::Heavenly),
            'M' => Some(MaxTier::Maximum),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Difficulty category named by a chart line's marker code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Novice,
    Advanced,
    Exhaust,
    Max(MaxTier),
}

impl Tier {
    /// Map a single-letter difficulty code (the letter after `LV<n>`).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'N' => Some(Tier::Novice),
            'A' => Some(Tier::Advanced),
            'E' => Some(Tier::Exhaust),
            other => MaxTier::from_code(other).map(Tier::Max),
        }
    }
}

// ============================================================================
// Extraction Output
// ============================================================================

/// Structured result of one chart source, before title normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartRecord {
    pub title: String,
    pub link_nov: Option<String>,
    pub link_adv: Option<String>,
    pub link_exh: Option<String>,
    pub link_max: Option<String>,
    pub max_tier: Option<MaxTier>,
}

impl ChartRecord {
    /// Ordinal of the maximum tier; 0 when no maximum-tier link was found.
    pub fn max_dif(&self) -> u8 {
        match (&self.link_max, self.max_tier) {
            (Some(_), Some(tier)) => tier.ordinal(),
            _ => 0,
        }
    }
}

/// Title forms produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub romanized: String,
    pub romanized_no_space: String,
    pub translated: String,
}

// ============================================================================
// Catalog Read Model
// ============================================================================

/// One song of the catalog. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub name: String,
    pub name_romanized: String,
    pub name_rom_no_space: String,
    pub name_translated: String,
    pub link_nov: Option<String>,
    pub link_adv: Option<String>,
    pub link_exh: Option<String>,
    pub link_max: Option<String>,
    /// 0 when `link_max` is absent, else the `MaxTier` ordinal (1-4).
    pub max_dif: u8,
}

impl Song {
    pub fn from_parts(record: ChartRecord, title: NormalizedTitle) -> Self {
        let max_dif = record.max_dif();
        Self {
            name: record.title,
            name_romanized: title.romanized,
            name_rom_no_space: title.romanized_no_space,
            name_translated: title.translated,
            link_nov: record.link_nov,
            link_adv: record.link_adv,
            link_exh: record.link_exh,
            link_max: record.link_max,
            max_dif,
        }
    }

    pub fn max_tier(&self) -> Option<MaxTier> {
        match self.max_dif {
            1 => Some(MaxTier::Infinite),
            2 => Some(MaxTier::Gravity),
            3 => Some(MaxTier::Heavenly),
            4 => Some(MaxTier::Maximum),
            _ => None,
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let link = |l: &Option<String>| l.clone().unwrap_or_default();
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.name,
            self.name_romanized,
            self.name_translated,
            link(&self.link_nov),
            link(&self.link_adv),
            link(&self.link_exh),
            link(&self.link_max)
        )
    }
}
