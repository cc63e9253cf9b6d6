//! # Star Catalog Loading, Filtering, and Ranking
//!
//! Loads a bright-star catalog from its JSON file and answers the central
//! rendering question: which stars are worth drawing for this observer at
//! this instant, and in what order?
//!
//! ## Pipeline
//!
//! 1. **Pre-filter** on the declared magnitude before any coordinate
//!    transform. The transform is the expensive step and the catalog holds
//!    thousands of entries while only a few hundred pass the naked-eye
//!    limit, so this guard dominates the pass's running time.
//! 2. **Transform** each surviving entry to horizon coordinates. Each
//!    star's computation is independent, so the loop runs on the rayon
//!    thread pool; the observer and instant are shared immutably by copy.
//! 3. **Cut** entries at or below the horizon.
//! 4. **Sort** ascending by magnitude (brightest first), a barrier after
//!    the parallel map.
//! 5. **Truncate** to the requested count, when one is given.
//!
//! ## Failure policy
//!
//! A malformed row (missing coordinates, unparseable RA/Dec, non-numeric
//! magnitude) is skipped with a logged reason and counted in the returned
//! [`BatchReport`]; one bad entry never aborts the catalog pass. A missing
//! or unreadable catalog file fails only the operation that needed it;
//! the rest of the sky-map pipeline keeps going.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::coords;
use crate::ephemeris::horizontal_from_equatorial;
use crate::{HorizontalPosition, Observer};

/// Errors raised while loading a catalog file.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be read (missing, permissions, ...).
    #[error("catalog IO: {0}")]
    Io(#[from] io::Error),

    /// File is not valid catalog JSON.
    #[error("catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON value that may arrive as either a number or a numeric string.
/// The catalog format is inconsistent about this, so both are accepted.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(value) => Some(*value),
            NumberOrText::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// One raw catalog row, in the catalog file's own field naming.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogEntry {
    /// Proper name, when the star has one.
    #[serde(rename = "N")]
    pub name: Option<String>,
    /// Right ascension string (hour-based forms).
    #[serde(rename = "RA")]
    pub ra: Option<String>,
    /// Declination string.
    #[serde(rename = "Dec")]
    pub dec: Option<String>,
    /// Visual magnitude; lower is brighter.
    #[serde(rename = "V")]
    pub magnitude: Option<NumberOrText>,
    /// Effective temperature in Kelvin, when known.
    #[serde(rename = "K")]
    pub temp_k: Option<NumberOrText>,
    /// IAU constellation abbreviation.
    #[serde(rename = "C")]
    pub constellation: Option<String>,
}

/// A read-only star catalog, loaded once and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct StarCatalog {
    entries: Vec<CatalogEntry>,
}

impl StarCatalog {
    /// Load a catalog from a JSON array file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(&path)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        info!(
            "loaded {} catalog entries from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(StarCatalog { entries })
    }

    /// Build a catalog from already-deserialized entries (tests, embedding).
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        StarCatalog { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A catalog star annotated with its computed horizon position.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleStar {
    /// Proper name, or a deterministic `Star_<n>` synthetic name, never
    /// empty, so consumers need no null-identity handling.
    pub name: String,
    /// Visual magnitude; the ranking key.
    pub magnitude: f64,
    /// IAU constellation abbreviation, when present in the catalog.
    pub constellation: Option<String>,
    /// Effective temperature in Kelvin, when present (drives marker color
    /// in renderers).
    pub temp_k: Option<f64>,
    /// Horizon position at the queried instant; azimuth raw `[0, 360)`.
    pub position: HorizontalPosition,
}

/// Counters for one ranking pass, for logs and test assertions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// Rows in the catalog file.
    pub total: usize,
    /// Rows that passed the magnitude pre-filter.
    pub prefiltered: usize,
    /// Rows transformed and found above the horizon.
    pub visible: usize,
    /// Rows dropped below the horizon.
    pub below_horizon: usize,
    /// Rows without a proper name that received a synthetic one.
    pub unnamed: usize,
    /// Skipped rows with their reasons, e.g. `"Star_12: unparseable
    /// coordinate \"xx\""`.
    pub skipped: Vec<String>,
}

/// Rank the catalog's visible stars for an observer and instant.
///
/// Returns the annotated stars sorted ascending by magnitude (ties keep
/// catalog order), truncated to `count` when given, together with the
/// pass's [`BatchReport`].
pub fn rank_visible(
    catalog: &StarCatalog,
    observer: Observer,
    instant: DateTime<Utc>,
    mag_limit: f64,
    count: Option<usize>,
) -> (Vec<VisibleStar>, BatchReport) {
    let mut report = BatchReport {
        total: catalog.len(),
        ..BatchReport::default()
    };

    // Step 1: magnitude pre-filter, before any transform.
    let prefiltered: Vec<(usize, &CatalogEntry, f64)> = catalog
        .entries
        .iter()
        .filter_map(|entry| {
            let magnitude = entry.magnitude.as_ref()?.as_f64()?;
            (magnitude <= mag_limit).then_some((entry, magnitude))
        })
        .enumerate()
        .map(|(index, (entry, magnitude))| (index, entry, magnitude))
        .collect();
    report.prefiltered = prefiltered.len();
    debug!(
        "pre-filtered {} of {} catalog entries at magnitude {}",
        report.prefiltered, report.total, mag_limit
    );

    // Steps 2-3: parallel transform and horizon cut. Each worker reads the
    // same observer/instant copies; nothing is mutated between stars.
    let outcomes: Vec<Result<Option<VisibleStar>, String>> = prefiltered
        .par_iter()
        .map(|&(index, entry, magnitude)| {
            let name = synthetic_name(entry, index);
            let (Some(ra), Some(dec)) = (entry.ra.as_deref(), entry.dec.as_deref()) else {
                return Err(format!("{name}: missing coordinates"));
            };
            let equatorial = coords::parse_equatorial(ra, dec)
                .map_err(|err| format!("{name}: {err}"))?;

            let position = horizontal_from_equatorial(equatorial, observer, instant);
            if position.altitude_deg <= 0.0 {
                return Ok(None);
            }
            Ok(Some(VisibleStar {
                name,
                magnitude,
                constellation: entry.constellation.clone(),
                temp_k: entry.temp_k.as_ref().and_then(NumberOrText::as_f64),
                position,
            }))
        })
        .collect();

    let mut visible = Vec::new();
    for (outcome, &(_, entry, _)) in outcomes.into_iter().zip(&prefiltered) {
        match outcome {
            Ok(Some(star)) => {
                if entry.name.is_none() {
                    report.unnamed += 1;
                }
                visible.push(star);
            }
            Ok(None) => report.below_horizon += 1,
            Err(reason) => {
                warn!("skipping catalog entry: {reason}");
                report.skipped.push(reason);
            }
        }
    }
    report.visible = visible.len();

    // Step 4: the magnitude sort is the barrier after the parallel map.
    visible.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude));

    // Step 5: optional truncation.
    if let Some(count) = count {
        visible.truncate(count);
    }

    info!(
        "star ranking: {} total, {} pre-filtered, {} visible, {} below horizon, {} skipped, returning {}",
        report.total,
        report.prefiltered,
        report.visible,
        report.below_horizon,
        report.skipped.len(),
        visible.len()
    );

    (visible, report)
}

/// Proper name when present, otherwise a deterministic positional name.
fn synthetic_name(entry: &CatalogEntry, prefilter_index: usize) -> String {
    match &entry.name {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => format!("Star_{}", prefilter_index + 1),
    }
}
