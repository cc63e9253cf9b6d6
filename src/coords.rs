//! Coordinate string parsing and azimuth centering.
//!
//! Star catalogs and constellation datasets deliver equatorial coordinates
//! in several textual conventions (`"12h 34m 56.7s"`, `"12:34:56.7"`,
//! `"+45° 30′ 15.3″"`). Everything is normalized here, at the boundary, to
//! the crate's degree-based [`EquatorialPosition`]. Unparseable input is an
//! error for the caller to skip and report: a bad row never becomes a
//! silent (0, 0) position and never aborts a batch.

use thiserror::Error;

use crate::EquatorialPosition;

/// Errors produced while parsing a coordinate string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The string was empty or contained no numeric components.
    #[error("empty coordinate string")]
    Empty,

    /// The string did not parse as any accepted coordinate form.
    #[error("unparseable coordinate {0:?}")]
    Invalid(String),

    /// The value parsed but lies outside the axis range.
    #[error("coordinate {0:?} out of range")]
    OutOfRange(String),
}

/// Remap a raw azimuth in `[0, 360)` to the centered plotting range.
///
/// `center_azimuth(az) = ((az - 180) mod 360) - 180`, giving `[-180, 180)`
/// with North preserved at 0. `center_azimuth(180.0)` is fixed at `-180.0`.
///
/// Apply exactly once, at the plotting boundary: all core APIs return raw
/// azimuths, and a centered value fed back through this function would wrap
/// a second time.
pub fn center_azimuth(azimuth_deg: f64) -> f64 {
    (azimuth_deg - 180.0).rem_euclid(360.0) - 180.0
}

/// Parse a right-ascension string to degrees.
///
/// Accepted forms:
/// - `"12h 34m 56.7s"` / `"12h34m56.7s"` (hours)
/// - `"12:34:56.7"` (hours)
/// - `"184° 58′ 30″"` (degrees, when a degree symbol is present)
/// - bare decimal, interpreted as hours (`"12.58"`), matching the catalog
///   convention this crate consumes
pub fn parse_right_ascension(s: &str) -> Result<f64, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let in_degrees = trimmed.contains('°') || trimmed.contains('d');
    let (sign, parts) = components(trimmed)?;
    if sign < 0.0 {
        // Right ascension has no negative convention in any accepted form.
        return Err(ParseError::OutOfRange(s.to_string()));
    }

    let value = sexagesimal(&parts);
    let degrees = if in_degrees { value } else { value * 15.0 };
    Ok(degrees.rem_euclid(360.0))
}

/// Parse a declination string to degrees.
///
/// Accepted forms: `"+45° 30′ 15.3″"`, `"-45:30:15.3"`, `"-05d 41m 03s"`,
/// bare decimal degrees. The sign of the leading component applies to the
/// whole value, including `-0° 30′` style strings.
pub fn parse_declination(s: &str) -> Result<f64, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (sign, parts) = components(trimmed)?;
    let degrees = sign * sexagesimal(&parts);
    if !(-90.0..=90.0).contains(&degrees) {
        return Err(ParseError::OutOfRange(s.to_string()));
    }
    Ok(degrees)
}

/// Parse a right-ascension/declination string pair into an
/// [`EquatorialPosition`].
pub fn parse_equatorial(ra: &str, dec: &str) -> Result<EquatorialPosition, ParseError> {
    Ok(EquatorialPosition {
        ra_deg: parse_right_ascension(ra)?,
        dec_deg: parse_declination(dec)?,
    })
}

/// Split a coordinate string into its sign and numeric components,
/// treating unit markers and separators as whitespace.
fn components(s: &str) -> Result<(f64, Vec<f64>), ParseError> {
    let sign = if s.starts_with('-') { -1.0 } else { 1.0 };

    let normalized: String = s
        .chars()
        .map(|c| match c {
            'h' | 'm' | 's' | 'd' | ':' => ' ',
            '°' | '\'' | '"' | '′' | '″' => ' ',
            '+' | '-' => ' ',
            other => other,
        })
        .collect();

    let mut parts = Vec::with_capacity(3);
    for token in normalized.split_whitespace() {
        let value: f64 = token
            .parse()
            .map_err(|_| ParseError::Invalid(s.to_string()))?;
        parts.push(value);
    }

    if parts.is_empty() {
        return Err(ParseError::Empty);
    }
    if parts.len() > 3 {
        return Err(ParseError::Invalid(s.to_string()));
    }
    Ok((sign, parts))
}

/// Combine up to three sexagesimal components into one value in the unit of
/// the leading component.
fn sexagesimal(parts: &[f64]) -> f64 {
    let whole = parts.first().copied().unwrap_or(0.0);
    let minutes = parts.get(1).copied().unwrap_or(0.0);
    let seconds = parts.get(2).copied().unwrap_or(0.0);
    whole + minutes / 60.0 + seconds / 3600.0
}
