//! Celestial coordinate pipeline.
//!
//! Converts UTC instants to Julian days and Greenwich sidereal time, turns
//! equatorial coordinates into horizon coordinates for an observer, and
//! produces geocentric positions for the Sun, the Moon, and the planets.
//!
//! The spherical trigonometry and orbital theory come from the `astro` and
//! `vsop87` crates; this module orchestrates them around `chrono` instants
//! and the crate's degree-based value types. Pluto, which VSOP87 does not
//! cover, is evaluated from mean Keplerian elements.

use std::f64::consts::PI;
use std::fmt;

use astro::angle::limit_to_two_PI;
use astro::coords::{alt_frm_eq, az_frm_eq};
use astro::ecliptic::mn_oblq_IAU;
use astro::time::{julian_day, mn_sidr, CalType, Date};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use vsop87::vsop87b;

use crate::{EquatorialPosition, HorizontalPosition, Observer};

/// Astronomical unit in kilometers.
pub const AU_KM: f64 = 1.496e8;

/// Ratio of the solar day to the sidereal day.
const SOLAR_TO_SIDEREAL: f64 = 1.002_737_909_35;

/// Anything that can be placed on the horizon grid for an observer and an
/// instant: an orbital body or a fixed equatorial direction.
pub trait CelestialBody {
    /// Horizon-frame position for the observer at the instant. Azimuth is
    /// raw `[0, 360)`; altitude may be negative (below the horizon).
    fn horizontal(&self, observer: Observer, instant: DateTime<Utc>) -> HorizontalPosition;

    /// Apparent disk semidiameter in degrees. Zero for point sources; the
    /// event finder adds this to altitude for upper-limb rise/set.
    fn angular_radius_deg(&self, _instant: DateTime<Utc>) -> f64 {
        0.0
    }

    /// Human-readable identity for logs and event records.
    fn label(&self) -> String;
}

/// A solar-system body with a time-dependent position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const ALL: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// The classical naked-eye planets charted by default.
    pub const BRIGHT_PLANETS: [Body; 5] = [
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    fn diameter_km(self) -> f64 {
        match self {
            Body::Sun => 1_391_400.0,
            Body::Moon => 3_475.0,
            Body::Mercury => 4_879.0,
            Body::Venus => 12_104.0,
            Body::Mars => 6_792.0,
            Body::Jupiter => 142_984.0,
            Body::Saturn => 120_536.0,
            Body::Uranus => 51_118.0,
            Body::Neptune => 49_528.0,
            Body::Pluto => 2_376.0,
        }
    }

    /// Geocentric equatorial coordinates at the instant.
    pub fn equatorial(self, instant: DateTime<Utc>) -> EquatorialPosition {
        let jd = julian_day_utc(instant);
        let (ecl_long, ecl_lat, _dist) = self.geocent_ecl(jd);
        let oblq = mn_oblq_IAU(jd);
        let (asc, dec) = (
            astro::coords::asc_frm_ecl(ecl_long, ecl_lat, oblq),
            astro::coords::dec_frm_ecl(ecl_long, ecl_lat, oblq),
        );
        EquatorialPosition {
            ra_deg: limit_to_two_PI(asc).to_degrees(),
            dec_deg: dec.to_degrees(),
        }
    }

    /// Geocentric distance in astronomical units.
    pub fn distance_au(self, instant: DateTime<Utc>) -> f64 {
        let (_, _, dist) = self.geocent_ecl(julian_day_utc(instant));
        dist
    }

    /// Geocentric ecliptic longitude/latitude in radians plus distance in AU.
    pub(crate) fn geocent_ecl(self, jd: f64) -> (f64, f64, f64) {
        match self {
            Body::Sun => {
                let (point, dist_au) = astro::sun::geocent_ecl_pos(jd);
                (limit_to_two_PI(point.long), point.lat, dist_au)
            }
            Body::Moon => {
                let (point, dist_km) = astro::lunar::geocent_ecl_pos(jd);
                (limit_to_two_PI(point.long), point.lat, dist_km / AU_KM)
            }
            Body::Mercury => geocent_from_heliocent(jd, spherical(vsop87b::mercury(jd))),
            Body::Venus => geocent_from_heliocent(jd, spherical(vsop87b::venus(jd))),
            Body::Mars => geocent_from_heliocent(jd, spherical(vsop87b::mars(jd))),
            Body::Jupiter => geocent_from_heliocent(jd, spherical(vsop87b::jupiter(jd))),
            Body::Saturn => geocent_from_heliocent(jd, spherical(vsop87b::saturn(jd))),
            Body::Uranus => geocent_from_heliocent(jd, spherical(vsop87b::uranus(jd))),
            Body::Neptune => geocent_from_heliocent(jd, spherical(vsop87b::neptune(jd))),
            Body::Pluto => geocent_from_heliocent(jd, pluto_heliocent(jd)),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CelestialBody for Body {
    fn horizontal(&self, observer: Observer, instant: DateTime<Utc>) -> HorizontalPosition {
        horizontal_from_equatorial(self.equatorial(instant), observer, instant)
    }

    fn angular_radius_deg(&self, instant: DateTime<Utc>) -> f64 {
        let dist_au = self.distance_au(instant);
        angular_diameter(dist_au, self.diameter_km()).to_degrees() / 2.0
    }

    fn label(&self) -> String {
        self.name().to_string()
    }
}

impl CelestialBody for EquatorialPosition {
    fn horizontal(&self, observer: Observer, instant: DateTime<Utc>) -> HorizontalPosition {
        horizontal_from_equatorial(*self, observer, instant)
    }

    fn label(&self) -> String {
        format!("RA {:.3}° Dec {:.3}°", self.ra_deg, self.dec_deg)
    }
}

/// Julian day for a UTC instant, including the day fraction.
pub fn julian_day_utc(instant: DateTime<Utc>) -> f64 {
    let date = Date {
        year: instant.year() as i16,
        month: instant.month() as u8,
        decimal_day: instant.day() as f64 + day_fraction(instant) / 24.0,
        cal_type: CalType::Gregorian,
    };
    julian_day(&date)
}

/// Convert equatorial coordinates to the observer's horizon frame.
///
/// Hour angle is Greenwich sidereal time plus east longitude minus right
/// ascension; altitude and azimuth follow the Meeus formulas, with the
/// azimuth shifted from the Meeus south-origin convention so that 0 = North,
/// increasing clockwise. Polar declinations pass through the atan2-based
/// trigonometry without faulting.
pub fn horizontal_from_equatorial(
    equatorial: EquatorialPosition,
    observer: Observer,
    instant: DateTime<Utc>,
) -> HorizontalPosition {
    let hour_angle = gmst_rad(instant) + observer.longitude_rad() - equatorial.ra_deg.to_radians();
    let dec = equatorial.dec_deg.to_radians();
    let lat = observer.latitude_rad();

    let alt = alt_frm_eq(hour_angle, dec, lat);
    let az = limit_to_two_PI(az_frm_eq(hour_angle, dec, lat) + PI);

    HorizontalPosition {
        azimuth_deg: az.to_degrees(),
        altitude_deg: alt.to_degrees(),
    }
}

/// Mean Greenwich sidereal time in radians.
fn gmst_rad(instant: DateTime<Utc>) -> f64 {
    let midnight = Date {
        year: instant.year() as i16,
        month: instant.month() as u8,
        decimal_day: instant.day() as f64,
        cal_type: CalType::Gregorian,
    };
    let jd = julian_day(&midnight);
    let gmst_hours = mn_sidr(jd).to_degrees() / 15.0 + day_fraction(instant) * SOLAR_TO_SIDEREAL;
    limit_to_two_PI((gmst_hours * 15.0).to_radians())
}

fn day_fraction(instant: DateTime<Utc>) -> f64 {
    instant.hour() as f64
        + instant.minute() as f64 / 60.0
        + (instant.second() as f64 + instant.nanosecond() as f64 * 1e-9) / 3600.0
}

/// Apparent angular diameter in radians, from distance in AU and body
/// diameter in km.
fn angular_diameter(distance_au: f64, diameter_km: f64) -> f64 {
    diameter_km / (distance_au * AU_KM)
}

fn spherical(coords: vsop87::SphericalCoordinates) -> (f64, f64, f64) {
    (coords.longitude(), coords.latitude(), coords.distance())
}

/// Geocentric ecliptic coordinates from heliocentric ones, via the Earth's
/// own heliocentric position at the same instant.
fn geocent_from_heliocent(jd: f64, heliocent: (f64, f64, f64)) -> (f64, f64, f64) {
    let (long, lat, dist) = heliocent;
    let earth = vsop87b::earth(jd);
    let (geo_long, geo_lat, geo_dist, _) = astro::planet::geocent_geomet_ecl_coords(
        earth.longitude(),
        earth.latitude(),
        earth.distance(),
        long,
        lat,
        dist,
    );
    (limit_to_two_PI(geo_long), geo_lat, geo_dist)
}

/// Heliocentric ecliptic position of Pluto from mean Keplerian elements
/// (JPL approximate elements, J2000 ecliptic, valid 1800-2050).
fn pluto_heliocent(jd: f64) -> (f64, f64, f64) {
    let t = (jd - 2_451_545.0) / 36_525.0;

    let a = 39.482_116_75 - 0.000_315_96 * t;
    let e = 0.248_827_30 + 0.000_051_70 * t;
    let incl = (17.140_012_06 + 0.000_048_18 * t).to_radians();
    let mean_long = (238.929_038_33 + 145.207_805_15 * t).to_radians();
    let peri_long = (224.068_916_29 - 0.040_629_42 * t).to_radians();
    let node = (110.303_936_84 - 0.011_834_82 * t).to_radians();

    let mean_anomaly = (mean_long - peri_long).rem_euclid(2.0 * PI);
    let ecc_anomaly = solve_kepler(mean_anomaly, e);

    let x_orb = a * (ecc_anomaly.cos() - e);
    let y_orb = a * (1.0 - e * e).sqrt() * ecc_anomaly.sin();

    let w = peri_long - node;
    let (cos_w, sin_w) = (w.cos(), w.sin());
    let (cos_o, sin_o) = (node.cos(), node.sin());
    let (cos_i, sin_i) = (incl.cos(), incl.sin());

    let x = (cos_o * cos_w - sin_o * sin_w * cos_i) * x_orb
        + (-cos_o * sin_w - sin_o * cos_w * cos_i) * y_orb;
    let y = (sin_o * cos_w + cos_o * sin_w * cos_i) * x_orb
        + (-sin_o * sin_w + cos_o * cos_w * cos_i) * y_orb;
    let z = sin_w * sin_i * x_orb + cos_w * sin_i * y_orb;

    let r = (x * x + y * y + z * z).sqrt();
    (y.atan2(x).rem_euclid(2.0 * PI), (z / r).asin(), r)
}

fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc_anomaly = mean_anomaly;
    for _ in 0..8 {
        ecc_anomaly = ecc_anomaly
            - (ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly) / (1.0 - e * ecc_anomaly.cos());
    }
    ecc_anomaly
}
