//! One-instant visibility snapshot for a set of bodies.

use chrono::{DateTime, Utc};

use crate::ephemeris::{Body, CelestialBody};
use crate::{HorizontalPosition, Observer};

/// Evaluate each body at the instant and keep those above the horizon.
///
/// Every body gets its own fresh transform with the same observer and
/// instant values; evaluations are independent and the result order
/// follows the input order, so no body's answer can depend on which bodies
/// were asked about before it.
pub fn visible_bodies(
    bodies: &[Body],
    observer: Observer,
    instant: DateTime<Utc>,
) -> Vec<(Body, HorizontalPosition)> {
    bodies
        .iter()
        .filter_map(|&body| {
            let position = body.horizontal(observer, instant);
            position.is_above(0.0).then_some((body, position))
        })
        .collect()
}
