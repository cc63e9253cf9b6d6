//! Moon phase state.
//!
//! Illumination comes from the phase-angle formula over the ephemeris Sun
//! and Moon positions; new and full moons are found where the Sun–Moon
//! elongation crosses 0° and 180°. Waxing/waning is decided against the
//! length of the *current* synodic month, the span between the
//! surrounding new moons, since real lunar months vary by half a day
//! around the mean.
//!
//! Phase naming uses the illumination-fraction buckets with waxing/waning
//! disambiguation. The breakpoints are contract values and
//! [`classify_phase`] is a pure function, testable without any ephemeris
//! call.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::{julian_day_utc, AU_KM};

/// Named moon phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    WaningCrescent,
    FirstQuarter,
    LastQuarter,
    WaxingGibbous,
    WaningGibbous,
    Full,
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::WaningCrescent => "Waning Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::Full => "Full Moon",
        };
        f.write_str(name)
    }
}

/// Full phase state for one instant. Recomputed per query, never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct MoonPhaseState {
    /// Illuminated fraction of the disk, `[0, 1]`.
    pub illumination: f64,
    /// True between new moon and the following full moon.
    pub waxing: bool,
    /// Named phase from [`classify_phase`].
    pub phase: MoonPhase,
    /// Days since the previous new moon.
    pub lunar_day: f64,
    /// Instant of the next new moon (UTC).
    pub next_new_moon: DateTime<Utc>,
    /// Instant of the next full moon (UTC).
    pub next_full_moon: DateTime<Utc>,
}

/// Classify an illumination fraction into a named phase.
///
/// Breakpoints: `< 0.03` New, `< 0.25` Crescent, `< 0.45` Quarter,
/// `< 0.75` Gibbous, otherwise Full; Crescent/Quarter/Gibbous split by the
/// waxing flag.
pub fn classify_phase(illumination: f64, waxing: bool) -> MoonPhase {
    if illumination < 0.03 {
        MoonPhase::New
    } else if illumination < 0.25 {
        if waxing {
            MoonPhase::WaxingCrescent
        } else {
            MoonPhase::WaningCrescent
        }
    } else if illumination < 0.45 {
        if waxing {
            MoonPhase::FirstQuarter
        } else {
            MoonPhase::LastQuarter
        }
    } else if illumination < 0.75 {
        if waxing {
            MoonPhase::WaxingGibbous
        } else {
            MoonPhase::WaningGibbous
        }
    } else {
        MoonPhase::Full
    }
}

/// Illuminated fraction of the Moon's disk at the instant.
pub fn illuminated_fraction(instant: DateTime<Utc>) -> f64 {
    let jd = julian_day_utc(instant);
    let (sun, sun_dist_au) = astro::sun::geocent_ecl_pos(jd);
    let (moon, moon_dist_km) = astro::lunar::geocent_ecl_pos(jd);
    let moon_dist_au = moon_dist_km / AU_KM;

    // Meeus: elongation from the ecliptic coordinates, then the phase
    // angle from the Sun/Moon distance triangle.
    let cos_elong = moon.lat.cos() * (moon.long - sun.long).cos();
    let elongation = cos_elong.clamp(-1.0, 1.0).acos();
    let phase_angle = (sun_dist_au * elongation.sin())
        .atan2(moon_dist_au - sun_dist_au * elongation.cos());

    ((1.0 + phase_angle.cos()) / 2.0).clamp(0.0, 1.0)
}

/// Moon phase state for the instant.
pub fn moon_phase(instant: DateTime<Utc>) -> MoonPhaseState {
    let prev_new = previous_phase_instant(instant, 0.0);
    let next_new = next_phase_instant(instant, 0.0);
    let next_full = next_phase_instant(instant, 180.0);

    let lunar_day = (instant - prev_new).num_seconds() as f64 / 86_400.0;
    let synodic_days = (next_new - prev_new).num_seconds() as f64 / 86_400.0;
    let waxing = lunar_day < synodic_days / 2.0;

    let illumination = illuminated_fraction(instant);

    MoonPhaseState {
        illumination,
        waxing,
        phase: classify_phase(illumination, waxing),
        lunar_day,
        next_new_moon: next_new,
        next_full_moon: next_full,
    }
}

/// Sun–Moon elongation in degrees, `[0, 360)`; 0 at new moon, 180 at full.
fn elongation_deg(instant: DateTime<Utc>) -> f64 {
    let jd = julian_day_utc(instant);
    let (sun, _) = astro::sun::geocent_ecl_pos(jd);
    let (moon, _) = astro::lunar::geocent_ecl_pos(jd);
    (moon.long - sun.long).to_degrees().rem_euclid(360.0)
}

/// Signed distance from the target elongation, `(-180, 180]`. Negative
/// approaching the target, positive just past it; the elongation only ever
/// increases, so each crossing is a negative-to-positive transition.
fn elongation_gap(instant: DateTime<Utc>, target_deg: f64) -> f64 {
    let gap = (elongation_deg(instant) - target_deg).rem_euclid(360.0);
    if gap > 180.0 {
        gap - 360.0
    } else {
        gap
    }
}

const PHASE_SCAN_STEP_HOURS: i64 = 6;
const PHASE_SCAN_LIMIT_DAYS: i64 = 35;

/// First instant after `from` where the elongation crosses `target_deg`.
fn next_phase_instant(from: DateTime<Utc>, target_deg: f64) -> DateTime<Utc> {
    let step = Duration::hours(PHASE_SCAN_STEP_HOURS);
    let deadline = from + Duration::days(PHASE_SCAN_LIMIT_DAYS);

    let mut t_prev = from;
    let mut gap_prev = elongation_gap(t_prev, target_deg);
    let mut t = from + step;

    while t <= deadline {
        let gap = elongation_gap(t, target_deg);
        if gap_prev < 0.0 && gap >= 0.0 && (gap - gap_prev) < 180.0 {
            return refine_crossing(t_prev, t, target_deg);
        }
        t_prev = t;
        gap_prev = gap;
        t += step;
    }

    // Unreachable in practice: the elongation crosses every target once
    // per synodic month, well inside the scan limit.
    deadline
}

/// Last crossing of `target_deg` at or before `from`.
fn previous_phase_instant(from: DateTime<Utc>, target_deg: f64) -> DateTime<Utc> {
    let step = Duration::hours(PHASE_SCAN_STEP_HOURS);
    let mut t_hi = from;
    let mut gap_hi = elongation_gap(t_hi, target_deg);
    let deadline = from - Duration::days(PHASE_SCAN_LIMIT_DAYS);

    let mut t = from - step;
    while t >= deadline {
        let gap = elongation_gap(t, target_deg);
        if gap < 0.0 && gap_hi >= 0.0 && (gap_hi - gap) < 180.0 {
            return refine_crossing(t, t_hi, target_deg);
        }
        t_hi = t;
        gap_hi = gap;
        t -= step;
    }
    deadline
}

/// Bisect an elongation crossing bracketed by `lo` (gap below zero) and
/// `hi` (gap at or above zero) down to the second.
fn refine_crossing(
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    target_deg: f64,
) -> DateTime<Utc> {
    for _ in 0..32 {
        if hi - lo <= Duration::seconds(1) {
            break;
        }
        let mid = lo + (hi - lo) / 2;
        if elongation_gap(mid, target_deg) >= 0.0 {
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
    use chrono::TimeZone;

    #[test]
    fn classification_breakpoints_are_exact() {
        assert_eq!(classify_phase(0.0, true), MoonPhase::New);
        assert_eq!(classify_phase(0.029, false), MoonPhase::New);
        assert_eq!(classify_phase(0.03, true), MoonPhase::WaxingCrescent);
        assert_eq!(classify_phase(0.24, false), MoonPhase::WaningCrescent);
        assert_eq!(classify_phase(0.25, true), MoonPhase::FirstQuarter);
        assert_eq!(classify_phase(0.44, false), MoonPhase::LastQuarter);
        assert_eq!(classify_phase(0.45, true), MoonPhase::WaxingGibbous);
        assert_eq!(classify_phase(0.74, false), MoonPhase::WaningGibbous);
        assert_eq!(classify_phase(0.75, true), MoonPhase::Full);
        assert_eq!(classify_phase(1.0, false), MoonPhase::Full);
    }

    #[test]
    fn phase_names_render_like_the_almanac() {
        assert_eq!(MoonPhase::WaxingGibbous.to_string(), "Waxing Gibbous");
        assert_eq!(MoonPhase::New.to_string(), "New Moon");
        assert_eq!(MoonPhase::Full.to_string(), "Full Moon");
    }

    #[test]
    fn syzygies_bracket_the_query_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 4, 22, 14, 0, 0).unwrap();
        let state = moon_phase(instant);

        assert!(state.next_new_moon > instant);
        assert!(state.next_full_moon > instant);
        assert!(state.lunar_day >= 0.0);
        assert!(
            state.lunar_day < 30.2,
            "lunar day {} exceeds any synodic month",
            state.lunar_day
        );
        assert!((0.0..=1.0).contains(&state.illumination));
    }

    #[test]
    fn elongation_vanishes_at_new_moon() {
        let instant = Utc.with_ymd_and_hms(2025, 4, 22, 14, 0, 0).unwrap();
        let next_new = next_phase_instant(instant, 0.0);
        let gap = elongation_gap(next_new, 0.0);
        assert!(gap.abs() < 0.05, "elongation gap {gap}° at found new moon");

        let next_full = next_phase_instant(instant, 180.0);
        let gap = elongation_gap(next_full, 180.0);
        assert!(gap.abs() < 0.05, "elongation gap {gap}° at found full moon");
    }

    #[test]
    fn synodic_month_has_realistic_length() {
        let instant = Utc.with_ymd_and_hms(2025, 4, 22, 14, 0, 0).unwrap();
        let prev_new = previous_phase_instant(instant, 0.0);
        let next_new = next_phase_instant(instant, 0.0);
        let days = (next_new - prev_new).num_seconds() as f64 / 86_400.0;
        assert!(
            (29.0..30.1).contains(&days),
            "synodic month of {days} days"
        );
    }

    #[test]
    fn illumination_rises_from_new_to_full_and_falls_after() {
        let instant = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let new_moon = next_phase_instant(instant, 0.0);
        let full_moon = next_phase_instant(new_moon, 180.0);
        let following_new = next_phase_instant(full_moon, 0.0);

        let mut t = new_moon + Duration::hours(12);
        let mut last = illuminated_fraction(new_moon);
        while t < full_moon {
            let frac = illuminated_fraction(t);
            assert!(
                frac >= last - 1e-6,
                "waxing illumination decreased at {t}: {last} -> {frac}"
            );
            last = frac;
            t += Duration::days(1);
        }

        let mut t = full_moon + Duration::hours(12);
        let mut last = illuminated_fraction(full_moon);
        while t < following_new {
            let frac = illuminated_fraction(t);
            assert!(
                frac <= last + 1e-6,
                "waning illumination increased at {t}: {last} -> {frac}"
            );
            last = frac;
            t += Duration::days(1);
        }
    }

    #[test]
    fn waxing_flag_flips_at_full_moon() {
        let instant = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let new_moon = next_phase_instant(instant, 0.0);
        let full_moon = next_phase_instant(new_moon, 180.0);

        let before_full = moon_phase(full_moon - Duration::days(2));
        let after_full = moon_phase(full_moon + Duration::days(2));
        assert!(before_full.waxing);
        assert!(!after_full.waxing);
    }
}
