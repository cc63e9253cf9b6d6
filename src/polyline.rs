//! Polyline splitting at the chart seam.
//!
//! A line drawn through centered-azimuth space must not jump across the
//! ±180° boundary in a single segment: a path leaving the right edge of the
//! chart re-enters on the left. [`wrap_polyline`] splits an ordered point
//! sequence into sub-polylines at each seam crossing, inserting the exact
//! crossing point on both edges so the drawn line still touches the seam.

/// Split a centered-azimuth point sequence at ±180° seam crossings.
///
/// Points are `[azimuth_centered, altitude]` pairs. Whenever two adjacent
/// points differ by more than 180° in x, the segment is split: the current
/// sub-polyline ends at the interpolated crossing on its side of the seam
/// and the next begins at the mirrored crossing on the other side. Every
/// returned sub-polyline therefore has adjacent x-deltas of at most 180°.
///
/// Fewer than two points cannot form a segment; the result is empty.
pub fn wrap_polyline(points: &[[f64; 2]]) -> Vec<Vec<[f64; 2]>> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = vec![points[0]];

    for pair in points.windows(2) {
        let [x0, y0] = pair[0];
        let [x1, y1] = pair[1];
        let dx = x1 - x0;

        if dx.abs() > 180.0 {
            // Crossing the seam: the shorter way around passes ±180.
            let seam = if dx < 0.0 { 180.0 } else { -180.0 };
            let x1_unwrapped = if dx < 0.0 { x1 + 360.0 } else { x1 - 360.0 };
            let span = x1_unwrapped - x0;
            let t = if span.abs() < f64::EPSILON {
                0.0
            } else {
                (seam - x0) / span
            };
            let y_cross = y0 + t * (y1 - y0);

            current.push([seam, y_cross]);
            segments.push(std::mem::replace(&mut current, vec![[-seam, y_cross]]));
            current.push([x1, y1]);
        } else {
            current.push([x1, y1]);
        }
    }

    segments.push(current);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn short_inputs_are_a_no_op() {
        assert!(wrap_polyline(&[]).is_empty());
        assert!(wrap_polyline(&[[10.0, 20.0]]).is_empty());
    }

    #[test]
    fn unbroken_line_passes_through() {
        let points = [[-30.0, 10.0], [0.0, 20.0], [30.0, 25.0]];
        let segments = wrap_polyline(&points);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], points.to_vec());
    }

    #[test]
    fn seam_crossing_splits_with_interpolated_point() {
        // 170 -> -170 is a 20° hop the short way around, crossing +180
        // exactly halfway between the two altitudes.
        let points = [[150.0, 10.0], [170.0, 20.0], [-170.0, 30.0], [-150.0, 40.0]];
        let segments = wrap_polyline(&points);
        assert_eq!(segments.len(), 2);

        let end = *segments[0].last().unwrap();
        let start = segments[1][0];
        assert_abs_diff_eq!(end[0], 180.0);
        assert_abs_diff_eq!(start[0], -180.0);
        assert_abs_diff_eq!(end[1], 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(start[1], 25.0, epsilon = 1e-9);

        for segment in &segments {
            for pair in segment.windows(2) {
                assert!(
                    (pair[1][0] - pair[0][0]).abs() <= 180.0,
                    "segment still spans the seam: {pair:?}"
                );
            }
        }
    }

    #[test]
    fn westward_crossing_splits_at_negative_seam() {
        let points = [[-170.0, 0.0], [170.0, 10.0]];
        let segments = wrap_polyline(&points);
        assert_eq!(segments.len(), 2);
        assert_abs_diff_eq!(segments[0].last().unwrap()[0], -180.0);
        assert_abs_diff_eq!(segments[1][0][0], 180.0);
    }

    #[test]
    fn multiple_crossings_yield_multiple_segments() {
        let points = [
            [170.0, 0.0],
            [-170.0, 0.0],
            [-170.0, 10.0],
            [170.0, 10.0],
            [170.0, 20.0],
        ];
        let segments = wrap_polyline(&points);
        assert_eq!(segments.len(), 3);
    }
}
