//! Celestial equator and ecliptic reference lines.
//!
//! Both lines are generated as above-horizon point sequences in the
//! horizon frame (raw azimuths); plot consumers center and seam-split them
//! like any other polyline source.

use chrono::{DateTime, Utc};

use astro::ecliptic::mn_oblq_IAU;

use crate::ephemeris::{horizontal_from_equatorial, julian_day_utc};
use crate::{EquatorialPosition, HorizontalPosition, Observer};

/// Above-horizon points along the celestial equator (declination 0),
/// swept over `samples` equal right-ascension steps.
pub fn celestial_equator(
    observer: Observer,
    instant: DateTime<Utc>,
    samples: usize,
) -> Vec<HorizontalPosition> {
    (0..=samples)
        .filter_map(|i| {
            let ra_deg = 360.0 * i as f64 / samples.max(1) as f64;
            let position = horizontal_from_equatorial(
                EquatorialPosition { ra_deg, dec_deg: 0.0 },
                observer,
                instant,
            );
            position.is_above(0.0).then_some(position)
        })
        .collect()
}

/// Above-horizon points along the ecliptic, swept over `samples` equal
/// ecliptic-longitude steps and tilted by the mean obliquity of date.
pub fn ecliptic(
    observer: Observer,
    instant: DateTime<Utc>,
    samples: usize,
) -> Vec<HorizontalPosition> {
    let oblq = mn_oblq_IAU(julian_day_utc(instant));
    (0..=samples)
        .filter_map(|i| {
            let lon = (360.0 * i as f64 / samples.max(1) as f64).to_radians();
            let ra = (lon.sin() * oblq.cos()).atan2(lon.cos());
            let dec = (lon.sin() * oblq.sin()).asin();
            let position = horizontal_from_equatorial(
                EquatorialPosition {
                    ra_deg: ra.to_degrees().rem_euclid(360.0),
                    dec_deg: dec.to_degrees(),
                },
                observer,
                instant,
            );
            position.is_above(0.0).then_some(position)
        })
        .collect()
}
