//! Sky-path sampling.
//!
//! Samples a body's horizon position at a fixed cadence across an interval,
//! dropping below-horizon points. The resulting sequence is chronological
//! and may be gapped; azimuths are raw `[0, 360)` and are centered only by
//! the plot consumer.

use chrono::{DateTime, Duration, Utc};
use log::warn;

use crate::ephemeris::CelestialBody;
use crate::{HorizontalPosition, Observer};

/// One sampled instant along a body's path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathPoint {
    pub instant: DateTime<Utc>,
    pub position: HorizontalPosition,
}

/// A chronological sequence of above-horizon positions for one body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathSample {
    pub points: Vec<PathPoint>,
}

impl PathSample {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The sampled point of greatest altitude (culmination marker).
    pub fn highest(&self) -> Option<&PathPoint> {
        self.points.iter().max_by(|a, b| {
            a.position
                .altitude_deg
                .total_cmp(&b.position.altitude_deg)
        })
    }
}

/// Sample `body` between `start` and `end` at the given cadence.
///
/// An `end` before `start` is treated as wrapping past midnight and moved
/// forward by 24 hours: a rise this evening with a set after midnight is a
/// valid interval, not an empty one. Points below the observer's horizon
/// offset are dropped, so the sample may have gaps. A zero-length interval
/// or non-positive step yields an empty sample.
pub fn sample_path<B: CelestialBody>(
    body: &B,
    observer: Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> PathSample {
    if step <= Duration::zero() {
        warn!(
            "non-positive sampling step {step} for {}; returning empty path",
            body.label()
        );
        return PathSample::default();
    }

    let end = if end < start { end + Duration::days(1) } else { end };

    let mut points = Vec::new();
    let mut t = start;
    while t < end {
        let position = body.horizontal(observer, t);
        if position.altitude_deg >= observer.horizon_offset_deg {
            points.push(PathPoint {
                instant: t,
                position,
            });
        }
        t += step;
    }

    PathSample { points }
}

/// Like [`sample_path`], but with the exact positions at `start` and `end`
/// spliced onto the ends of the sequence.
///
/// Used with rise/set instants so the path's first and last markers sit on
/// the horizon line itself rather than at the nearest sampling tick.
pub fn sample_path_with_endpoints<B: CelestialBody>(
    body: &B,
    observer: Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> PathSample {
    let mut sample = sample_path(body, observer, start, end, step);
    if step <= Duration::zero() {
        return sample;
    }

    let end = if end < start { end + Duration::days(1) } else { end };

    sample.points.insert(
        0,
        PathPoint {
            instant: start,
            position: body.horizontal(observer, start),
        },
    );
    sample.points.push(PathPoint {
        instant: end,
        position: body.horizontal(observer, end),
    });
    sample
}
