//! Rise and set event finding.
//!
//! A body is considered risen when its upper limb (the disk center plus
//! the apparent semidiameter) crosses the observer's horizon offset, the
//! convention the Sun and Moon tables use. Events are located with a coarse
//! forward scan followed by bisection, and the search is bounded: a body
//! that never crosses the horizon within the window (circumpolar or
//! never-rising at the latitude) yields a distinct
//! [`RiseSetError::NoEventInWindow`] instead of a stale time.

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use thiserror::Error;

use crate::ephemeris::CelestialBody;
use crate::{HorizontalPosition, Observer};

/// Forward search bound. Nothing the finder tracks takes longer than two
/// days between horizon crossings at non-polar latitudes.
const SEARCH_WINDOW_HOURS: i64 = 48;

/// Coarse scan step. Must stay well under the shortest above-horizon arc
/// the finder is expected to resolve.
const COARSE_STEP_MINUTES: i64 = 5;

/// Bisection iterations; 48 h / 5 min halved 32 times is far below a
/// millisecond.
const REFINE_ITERATIONS: u32 = 32;

/// How far the event altitude may drift from the horizon before the result
/// is logged as suspicious.
const ALTITUDE_TOLERANCE_DEG: f64 = 0.5;

/// A horizon crossing for one body.
#[derive(Clone, Debug, PartialEq)]
pub struct RiseSetEvent {
    /// Which body crossed.
    pub body: String,
    /// Crossing instant (UTC).
    pub instant: DateTime<Utc>,
    /// Horizon position at the crossing; altitude is near the observer's
    /// horizon offset by construction.
    pub position: HorizontalPosition,
}

/// Failure modes of the event finder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiseSetError {
    /// No horizon crossing of the requested direction occurred inside the
    /// bounded search window. Callers must branch on this explicitly;
    /// circumpolar skies are an expected condition, not a fault.
    #[error("no {direction} of {body} within {window_hours} h of {start}")]
    NoEventInWindow {
        body: String,
        direction: &'static str,
        start: DateTime<Utc>,
        window_hours: i64,
    },
}

#[derive(Clone, Copy, PartialEq)]
enum Crossing {
    Rising,
    Setting,
}

impl Crossing {
    fn direction(self) -> &'static str {
        match self {
            Crossing::Rising => "rising",
            Crossing::Setting => "setting",
        }
    }
}

/// Next upper-limb rise of `body` at or after `from`.
pub fn next_rising<B: CelestialBody>(
    body: &B,
    observer: Observer,
    from: DateTime<Utc>,
) -> Result<RiseSetEvent, RiseSetError> {
    next_crossing(body, observer, from, Crossing::Rising)
}

/// Next upper-limb set of `body` at or after `from`.
pub fn next_setting<B: CelestialBody>(
    body: &B,
    observer: Observer,
    from: DateTime<Utc>,
) -> Result<RiseSetEvent, RiseSetError> {
    next_crossing(body, observer, from, Crossing::Setting)
}

/// The next rise after `start` and the set that follows it.
///
/// The set search begins at the found rise instant, so the pair brackets
/// one continuous above-horizon arc even when it spans midnight.
pub fn find_rise_set<B: CelestialBody>(
    body: &B,
    observer: Observer,
    start: DateTime<Utc>,
) -> Result<(RiseSetEvent, RiseSetEvent), RiseSetError> {
    let rise = next_rising(body, observer, start)?;
    let set = next_setting(body, observer, rise.instant)?;
    Ok((rise, set))
}

/// Upper-limb altitude relative to the observer's horizon offset; positive
/// means the limb shows above the horizon.
fn limb_offset<B: CelestialBody>(body: &B, observer: Observer, instant: DateTime<Utc>) -> f64 {
    body.horizontal(observer, instant).altitude_deg + body.angular_radius_deg(instant)
        - observer.horizon_offset_deg
}

fn next_crossing<B: CelestialBody>(
    body: &B,
    observer: Observer,
    from: DateTime<Utc>,
    crossing: Crossing,
) -> Result<RiseSetEvent, RiseSetError> {
    // Rising looks for a negative-to-positive limb transition; setting is
    // the mirror image, handled by flipping the sign once.
    let sign = match crossing {
        Crossing::Rising => 1.0,
        Crossing::Setting => -1.0,
    };
    let f = |t: DateTime<Utc>| sign * limb_offset(body, observer, t);

    let step = Duration::minutes(COARSE_STEP_MINUTES);
    let deadline = from + Duration::hours(SEARCH_WINDOW_HOURS);

    let mut t_prev = from;
    let mut f_prev = f(t_prev);
    let mut t = from + step;

    while t <= deadline {
        let f_cur = f(t);
        if f_prev <= 0.0 && f_cur > 0.0 {
            let instant = refine(&f, t_prev, t);
            let position = body.horizontal(observer, instant);

            let drift = (position.altitude_deg - observer.horizon_offset_deg).abs();
            if drift > ALTITUDE_TOLERANCE_DEG {
                warn!(
                    "{} {} at {} has altitude {:.2}°, {:.2}° from the horizon",
                    body.label(),
                    crossing.direction(),
                    instant,
                    position.altitude_deg,
                    drift
                );
            }
            debug!(
                "{} {} at {} (az {:.2}°)",
                body.label(),
                crossing.direction(),
                instant,
                position.azimuth_deg
            );

            return Ok(RiseSetEvent {
                body: body.label(),
                instant,
                position,
            });
        }
        t_prev = t;
        f_prev = f_cur;
        t += step;
    }

    Err(RiseSetError::NoEventInWindow {
        body: body.label(),
        direction: crossing.direction(),
        start: from,
        window_hours: SEARCH_WINDOW_HOURS,
    })
}

/// Bisect the crossing bracketed by `lo` (at or below zero) and `hi`
/// (above zero).
fn refine(
    f: &impl Fn(DateTime<Utc>) -> f64,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
) -> DateTime<Utc> {
    for _ in 0..REFINE_ITERATIONS {
        if hi - lo <= Duration::milliseconds(500) {
            break;
        }
        let mid = lo + (hi - lo) / 2;
        if f(mid) > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::Body;
    use crate::EquatorialPosition;
    use chrono::TimeZone;

    fn brisbane() -> Observer {
        Observer::new(-27.47, 153.02)
    }

    fn local_midnight_2025_04_23() -> DateTime<Utc> {
        // 2025-04-23 00:00 Brisbane (UTC+10)
        Utc.with_ymd_and_hms(2025, 4, 22, 14, 0, 0).unwrap()
    }

    #[test]
    fn sun_rises_before_it_sets() {
        let (rise, set) = find_rise_set(&Body::Sun, brisbane(), local_midnight_2025_04_23())
            .expect("the sun rises daily in Brisbane");
        assert!(rise.instant < set.instant);

        // Late April in Brisbane: day length between 10 and 13 hours.
        let daylight = set.instant - rise.instant;
        assert!(
            (10..=13).contains(&daylight.num_hours()),
            "implausible daylight span: {daylight}"
        );
    }

    #[test]
    fn crossings_sit_on_the_horizon() {
        let observer = brisbane();
        let (rise, set) = find_rise_set(&Body::Moon, observer, local_midnight_2025_04_23())
            .expect("the moon rises daily in Brisbane");
        for event in [&rise, &set] {
            assert!(
                event.position.altitude_deg.abs() <= ALTITUDE_TOLERANCE_DEG,
                "{} altitude {:.3}° at crossing",
                event.body,
                event.position.altitude_deg
            );
        }
        // Sunlike bodies rise through the eastern half of the sky and set
        // through the western half.
        assert!(rise.position.azimuth_deg < 180.0);
        assert!(set.position.azimuth_deg > 180.0);
    }

    #[test]
    fn circumpolar_star_reports_no_event() {
        // The south celestial pole region never sets for a southern
        // observer, and never rises either.
        let polar = EquatorialPosition {
            ra_deg: 0.0,
            dec_deg: -89.0,
        };
        let err = next_setting(&polar, brisbane(), local_midnight_2025_04_23()).unwrap_err();
        match err {
            RiseSetError::NoEventInWindow { direction, .. } => {
                assert_eq!(direction, "setting");
            }
        }

        let northern = EquatorialPosition {
            ra_deg: 0.0,
            dec_deg: 89.0,
        };
        assert!(next_rising(&northern, brisbane(), local_midnight_2025_04_23()).is_err());
    }

    #[test]
    fn finder_is_deterministic() {
        let a = find_rise_set(&Body::Sun, brisbane(), local_midnight_2025_04_23()).unwrap();
        let b = find_rise_set(&Body::Sun, brisbane(), local_midnight_2025_04_23()).unwrap();
        assert_eq!(a.0.instant, b.0.instant);
        assert_eq!(a.1.instant, b.1.instant);
    }

    #[test]
    fn upper_limb_rises_earlier_than_center() {
        // The same direction as the Sun but with no disk must rise later:
        // the limb correction only ever advances the rise.
        let observer = brisbane();
        let start = local_midnight_2025_04_23();
        let sun_rise = next_rising(&Body::Sun, observer, start).unwrap();
        let center = Body::Sun.equatorial(sun_rise.instant);
        let center_rise = next_rising(&center, observer, start).unwrap();
        assert!(
            sun_rise.instant < center_rise.instant,
            "limb {} vs center {}",
            sun_rise.instant,
            center_rise.instant
        );
    }
}
