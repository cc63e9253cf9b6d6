//! # Starmap CLI
//!
//! Command-line shell around the starmap core library. Computes the full
//! sky state for the configured observer and a chosen local date: moon
//! phase, sun and moon paths with rise/set markers, ranked visible stars,
//! constellation figures, planet visibility. Prints a text summary
//! plus an optional ASCII chart.
//!
//! Every stage degrades independently: a missing star catalog costs the
//! star list (with a logged error) but never the sun/moon/planet output.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use log::{error, info, warn};

use starmap_lib::catalog::{self, StarCatalog};
use starmap_lib::config::Config;
use starmap_lib::constellations::{self, ConstellationSet};
use starmap_lib::coords::center_azimuth;
use starmap_lib::ephemeris::Body;
use starmap_lib::events::{self, RiseSetError};
use starmap_lib::moonphase;
use starmap_lib::path::{self, PathSample};
use starmap_lib::polyline::wrap_polyline;
use starmap_lib::renderer::AsciiChart;
use starmap_lib::{lines, snapshot, HorizontalPosition, Observer};

/// Parsed command-line options.
struct Options {
    /// Local calendar date to chart; defaults to today at the configured
    /// offset.
    date: Option<NaiveDate>,
    /// Emit the ASCII chart in addition to the summary.
    chart: bool,
    /// Alternate configuration file path.
    config_path: Option<String>,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut options = Options {
        date: None,
        chart: false,
        config_path: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--chart" => options.chart = true,
            "--date" => {
                let value = args.next().ok_or_else(|| anyhow!("--date needs a value"))?;
                let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .with_context(|| format!("invalid --date {value:?}, expected YYYY-MM-DD"))?;
                options.date = Some(date);
            }
            "--config" => {
                options.config_path =
                    Some(args.next().ok_or_else(|| anyhow!("--config needs a value"))?);
            }
            other => return Err(anyhow!("unknown argument {other:?}")),
        }
    }
    Ok(options)
}

fn local_offset(config: &Config) -> FixedOffset {
    let seconds = (config.observer.utc_offset_hours * 3600.0) as i32;
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        warn!(
            "invalid utc_offset_hours {}; falling back to UTC",
            config.observer.utc_offset_hours
        );
        FixedOffset::east_opt(0).expect("zero offset is valid")
    })
}

fn format_local(instant: DateTime<Utc>, tz: FixedOffset) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// Sun or Moon block: rise/set events, the path between them, and summary
/// lines. A circumpolar result is reported, not fatal.
fn chart_body_path(
    body: Body,
    observer: Observer,
    midnight_utc: DateTime<Utc>,
    step: Duration,
    tz: FixedOffset,
) -> Option<PathSample> {
    match events::find_rise_set(&body, observer, midnight_utc) {
        Ok((rise, set)) => {
            println!(
                "{}: rises {} (az {:.0}°), sets {} (az {:.0}°)",
                body,
                format_local(rise.instant, tz),
                rise.position.azimuth_deg,
                format_local(set.instant, tz),
                set.position.azimuth_deg
            );
            let sample =
                path::sample_path_with_endpoints(&body, observer, rise.instant, set.instant, step);
            if let Some(highest) = sample.highest() {
                println!(
                    "{}: culminates {} at {:.0}° altitude",
                    body,
                    format_local(highest.instant, tz),
                    highest.position.altitude_deg
                );
            }
            Some(sample)
        }
        Err(RiseSetError::NoEventInWindow { direction, .. }) => {
            println!("{body}: no {direction} within the search window");
            None
        }
    }
}

fn centered_points(points: &[HorizontalPosition]) -> Vec<[f64; 2]> {
    points
        .iter()
        .map(|p| [center_azimuth(p.azimuth_deg), p.altitude_deg])
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args()?;
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let observer = config.observer.observer();
    let tz = local_offset(&config);

    // Chosen local date; midnight anchors the sun/moon day, 22:00 is the
    // stargazing evaluation instant.
    let date = options
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
    let midnight_local = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists on every date");
    let midnight_utc = tz
        .from_local_datetime(&midnight_local)
        .single()
        .ok_or_else(|| anyhow!("ambiguous local midnight"))?
        .with_timezone(&Utc);
    let evening_utc = midnight_utc + Duration::hours(22);

    println!(
        "Sky over {:.2}°, {:.2}° (elev {:.0} m) on {date}",
        observer.latitude_deg, observer.longitude_deg, observer.elevation_m
    );

    // Moon phase block.
    let phase = moonphase::moon_phase(midnight_utc);
    println!(
        "Moon: {} ({:.0}% lit), lunar day {:.0}",
        phase.phase,
        phase.illumination * 100.0,
        phase.lunar_day
    );
    println!(
        "Next new moon {}, next full moon {}",
        phase.next_new_moon.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        phase.next_full_moon.with_timezone(&tz).format("%Y-%m-%d %H:%M")
    );

    // Sun and moon paths.
    let step = Duration::minutes(config.sampling.sun_moon_step_minutes);
    let sun_path = chart_body_path(Body::Sun, observer, midnight_utc, step, tz);
    let moon_path = chart_body_path(Body::Moon, observer, midnight_utc, step, tz);

    // Ranked stars. A missing catalog degrades to an empty list.
    let ranked = match StarCatalog::load(&config.stars.catalog_path) {
        Ok(catalog) => {
            let (stars, report) = catalog::rank_visible(
                &catalog,
                observer,
                evening_utc,
                config.stars.naked_eye_mag_limit,
                config.stars.max_stars_to_plot,
            );
            if !report.skipped.is_empty() {
                warn!("{} catalog entries skipped", report.skipped.len());
            }
            println!(
                "Stars: {} visible of {} cataloged (magnitude ≤ {})",
                report.visible, report.total, config.stars.naked_eye_mag_limit
            );
            for star in stars.iter().take(10) {
                let constellation = star
                    .constellation
                    .as_deref()
                    .and_then(constellations::full_name)
                    .or(star.constellation.as_deref())
                    .unwrap_or("—");
                println!(
                    "  {:<12} m={:+.2}  {}  az {:>5.1}° alt {:>4.1}°",
                    star.name,
                    star.magnitude,
                    constellation,
                    star.position.azimuth_deg,
                    star.position.altitude_deg
                );
            }
            stars
        }
        Err(err) => {
            error!(
                "star catalog {} unavailable: {err}; continuing without stars",
                config.stars.catalog_path
            );
            Vec::new()
        }
    };

    // Constellation figures, same degradation policy.
    let figures = match ConstellationSet::load(&config.constellations.lines_path) {
        Ok(set) => set.project(
            observer,
            evening_utc,
            config.constellations.show_only.as_deref(),
            config.constellations.max_to_plot,
        ),
        Err(err) => {
            error!(
                "constellation data {} unavailable: {err}; continuing without figures",
                config.constellations.lines_path
            );
            Vec::new()
        }
    };
    if !figures.is_empty() {
        let names: Vec<&str> = figures.iter().map(|f| f.id.as_str()).collect();
        println!("Constellations up: {}", names.join(", "));
    }

    // Planets at the stargazing instant.
    let planets = snapshot::visible_bodies(&Body::BRIGHT_PLANETS, observer, evening_utc);
    if planets.is_empty() {
        println!("No bright planets above the horizon at {}", format_local(evening_utc, tz));
    } else {
        for (body, position) in &planets {
            println!(
                "{}: az {:.1}° alt {:.1}° at {}",
                body,
                position.azimuth_deg,
                position.altitude_deg,
                format_local(evening_utc, tz)
            );
        }
    }

    if options.chart {
        let mut chart = AsciiChart::new();

        let samples = config.sampling.line_samples;
        let equator = centered_points(&lines::celestial_equator(observer, evening_utc, samples));
        chart.plot_polylines(&wrap_polyline(&equator), '~');
        let ecliptic = centered_points(&lines::ecliptic(observer, evening_utc, samples));
        chart.plot_polylines(&wrap_polyline(&ecliptic), '·');

        for figure in &figures {
            chart.plot_polylines(&figure.polylines, '+');
        }
        for star in &ranked {
            let glyph = if star.magnitude < config.stars.label_mag_limit {
                '*'
            } else {
                '.'
            };
            chart.plot(
                center_azimuth(star.position.azimuth_deg),
                star.position.altitude_deg,
                glyph,
            );
        }

        let planet_step = Duration::minutes(config.sampling.planet_step_minutes);
        for &body in &Body::BRIGHT_PLANETS {
            let sample = path::sample_path(
                &body,
                observer,
                midnight_utc,
                midnight_utc + Duration::days(1),
                planet_step,
            );
            let glyph = body.name().chars().next().unwrap_or('?');
            chart.plot_path(&sample, glyph);
        }

        if let Some(sample) = &sun_path {
            chart.plot_path(sample, 'o');
        }
        if let Some(sample) = &moon_path {
            chart.plot_path(sample, ')');
        }

        print!("{}", chart.render());
    }

    info!("sky map computed for {date}");
    Ok(())
}
