//! # Starmap Core Library
//!
//! This library computes everything a sky-map renderer needs to place
//! celestial objects on an azimuth/altitude ("horizon") chart: positions of
//! stars, planets, the Sun and the Moon for an observer at a given location
//! and instant, rise/set events, sampled sky paths, moon-phase state, and
//! wrap-safe polylines for lines that cross the chart seam.
//!
//! ## Design Philosophy
//!
//! ### Pure computation, rendering at the edges
//! The library never draws, fetches, or caches pixels. Every entry point
//! takes plain data (an [`Observer`], a UTC instant, a loaded catalog) and
//! returns plain data. The `starmap` binary's ASCII chart is the only
//! renderer in-tree and consumes the same outputs any other renderer would.
//!
//! ### Time handling
//! All computation runs on `chrono::DateTime<Utc>`. Local time zones exist
//! only at presentation boundaries (the CLI formats event times with a
//! configured UTC offset). No function ever interprets a naive local time.
//!
//! ### Azimuth convention
//! Core results carry raw azimuth in `[0, 360)` degrees, 0 = North,
//! increasing eastward. Plot consumers remap to the centered `[-180, 180)`
//! range with [`coords::center_azimuth`] exactly once, at the plotting
//! boundary. Values are never centered twice.
//!
//! ### Derived data is transient
//! Horizontal positions, path samples, rise/set events, and moon-phase
//! state are recomputed per request and owned by the caller. The only
//! long-lived values are the read-only star catalog, the constellation
//! line set, and the configuration.

use serde::{Deserialize, Serialize};

// Module declarations
pub mod catalog;
pub mod config;
pub mod constellations;
pub mod coords;
pub mod ephemeris;
pub mod events;
pub mod lines;
pub mod moonphase;
pub mod path;
pub mod polyline;
pub mod renderer;
pub mod snapshot;

/// An observing site on Earth.
///
/// `Observer` is an immutable location value. The evaluation instant is
/// always a separate parameter threaded through each call, so one observer
/// can serve any number of sequential or parallel queries without hidden
/// state.
///
/// # Example
/// ```
/// use starmap_lib::Observer;
///
/// // Brisbane, at sea level
/// let brisbane = Observer {
///     latitude_deg: -27.47,
///     longitude_deg: 153.02,
///     elevation_m: 0.0,
///     horizon_offset_deg: 0.0,
/// };
/// assert!(brisbane.latitude_deg < 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geographic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Geographic longitude in degrees, east positive.
    pub longitude_deg: f64,
    /// Elevation above sea level in meters (reported, not used in the
    /// coordinate transform).
    pub elevation_m: f64,
    /// Altitude of the effective horizon in degrees. Rise/set events and
    /// path sampling test against this; 0 is the astronomical horizon.
    pub horizon_offset_deg: f64,
}

impl Observer {
    /// Observer at the given latitude/longitude with sea-level elevation
    /// and a 0-degree horizon.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Observer {
            latitude_deg,
            longitude_deg,
            elevation_m: 0.0,
            horizon_offset_deg: 0.0,
        }
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

/// A direction on the celestial sphere in equatorial coordinates.
///
/// Both axes are stored in degrees; right ascension is `[0, 360)` and
/// declination `[-90, 90]`. String forms in hours/minutes/seconds are
/// converted at the parsing boundary ([`coords::parse_equatorial`]), so a
/// value of this type is never ambiguous about units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPosition {
    /// Right ascension in degrees.
    pub ra_deg: f64,
    /// Declination in degrees.
    pub dec_deg: f64,
}

/// A sky position in the observer's horizon frame.
///
/// Azimuth is raw `[0, 360)` degrees (0 = North, increasing eastward);
/// altitude is `[-90, 90]` degrees with 0 at the horizon. Negative
/// altitudes are returned as-is; filtering below-horizon positions is the
/// caller's decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizontalPosition {
    /// Compass bearing in degrees, `[0, 360)`.
    pub azimuth_deg: f64,
    /// Angle above the horizon in degrees, `[-90, 90]`.
    pub altitude_deg: f64,
}

impl HorizontalPosition {
    /// True if the position is above the given horizon altitude.
    pub fn is_above(&self, horizon_deg: f64) -> bool {
        self.altitude_deg > horizon_deg
    }
}
