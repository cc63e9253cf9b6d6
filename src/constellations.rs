//! Constellation line figures.
//!
//! Loads the constellation line dataset (GeoJSON-style features whose
//! geometry is a list of line strings in RA/Dec degrees), projects each
//! figure into the observer's horizon frame, and returns seam-safe centered
//! polylines ready for a line renderer, plus a label anchor per figure.
//!
//! This is the one place in the core that emits *centered* azimuths: the
//! projection is the plotting boundary for constellation figures, and the
//! seam split must run in centered space.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::coords::center_azimuth;
use crate::ephemeris::horizontal_from_equatorial;
use crate::polyline::wrap_polyline;
use crate::{EquatorialPosition, Observer};

/// Errors raised while loading a constellation line file.
#[derive(Error, Debug)]
pub enum ConstellationError {
    #[error("constellation data IO: {0}")]
    Io(#[from] io::Error),

    #[error("constellation data JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Deserialize)]
struct LineFile {
    features: Vec<Feature>,
}

#[derive(Clone, Debug, Deserialize)]
struct Feature {
    id: String,
    geometry: Geometry,
}

#[derive(Clone, Debug, Deserialize)]
struct Geometry {
    /// Line strings of `[ra_deg, dec_deg]` vertices. RA may be negative in
    /// the source data and is normalized on projection.
    coordinates: Vec<Vec<[f64; 2]>>,
}

/// The loaded constellation line dataset.
#[derive(Clone, Debug, Default)]
pub struct ConstellationSet {
    features: Vec<Feature>,
}

/// One constellation projected for an observer and instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstellationFigure {
    /// Dataset id, the IAU abbreviation (e.g. `"Ori"`).
    pub id: String,
    /// Centered, seam-split polylines of `[azimuth_centered, altitude]`
    /// points, above-horizon vertices only.
    pub polylines: Vec<Vec<[f64; 2]>>,
    /// A point of the figure nearest its centroid, for label placement.
    pub label_anchor: [f64; 2],
}

impl ConstellationSet {
    /// Load a line dataset from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConstellationError> {
        let raw = fs::read_to_string(&path)?;
        let file: LineFile = serde_json::from_str(&raw)?;
        info!(
            "loaded {} constellation figures from {}",
            file.features.len(),
            path.as_ref().display()
        );
        Ok(ConstellationSet {
            features: file.features,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Project the set into horizon polylines for the observer and instant.
    ///
    /// `show_only` restricts to the listed ids; `max_figures` caps how many
    /// features are projected. Vertices below the horizon are dropped and
    /// line strings left with fewer than two surviving vertices vanish; a
    /// figure with no surviving line strings is omitted entirely.
    pub fn project(
        &self,
        observer: Observer,
        instant: DateTime<Utc>,
        show_only: Option<&[String]>,
        max_figures: Option<usize>,
    ) -> Vec<ConstellationFigure> {
        let selected: Vec<&Feature> = self
            .features
            .iter()
            .filter(|feature| match show_only {
                Some(ids) => ids.iter().any(|id| id == &feature.id),
                None => true,
            })
            .take(max_figures.unwrap_or(usize::MAX))
            .collect();

        let mut figures = Vec::new();
        for feature in selected {
            let mut polylines = Vec::new();
            let mut all_points = Vec::new();

            for line in &feature.geometry.coordinates {
                let mut points = Vec::with_capacity(line.len());
                for &[ra, dec] in line {
                    let ra_deg = if ra < 0.0 { ra + 360.0 } else { ra };
                    let position = horizontal_from_equatorial(
                        EquatorialPosition {
                            ra_deg,
                            dec_deg: dec,
                        },
                        observer,
                        instant,
                    );
                    if position.altitude_deg > 0.0 {
                        points.push([
                            center_azimuth(position.azimuth_deg),
                            position.altitude_deg,
                        ]);
                    }
                }
                if points.len() >= 2 {
                    all_points.extend_from_slice(&points);
                    polylines.extend(wrap_polyline(&points));
                }
            }

            if polylines.is_empty() {
                continue;
            }
            figures.push(ConstellationFigure {
                id: feature.id.clone(),
                label_anchor: nearest_to_centroid(&all_points),
                polylines,
            });
        }

        if figures.is_empty() {
            warn!("no constellation figures above the horizon");
        }
        figures
    }
}

/// The member point closest to the centroid of `points`.
fn nearest_to_centroid(points: &[[f64; 2]]) -> [f64; 2] {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = points.iter().map(|p| p[1]).sum::<f64>() / n;
    *points
        .iter()
        .min_by(|a, b| {
            let da = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
            let db = (b[0] - cx).powi(2) + (b[1] - cy).powi(2);
            da.total_cmp(&db)
        })
        .expect("caller guarantees at least one point")
}

/// Full name for an IAU constellation abbreviation, when known.
pub fn full_name(abbr: &str) -> Option<&'static str> {
    let name = match abbr {
        "And" => "Andromeda",
        "Ant" => "Antlia",
        "Aps" => "Apus",
        "Aqr" => "Aquarius",
        "Aql" => "Aquila",
        "Ara" => "Ara",
        "Ari" => "Aries",
        "Aur" => "Auriga",
        "Boo" => "Boötes",
        "Cae" => "Caelum",
        "Cam" => "Camelopardalis",
        "Cnc" => "Cancer",
        "CVn" => "Canes Venatici",
        "CMa" => "Canis Major",
        "CMi" => "Canis Minor",
        "Cap" => "Capricornus",
        "Car" => "Carina",
        "Cas" => "Cassiopeia",
        "Cen" => "Centaurus",
        "Cep" => "Cepheus",
        "Cet" => "Cetus",
        "Cha" => "Chamaeleon",
        "Cir" => "Circinus",
        "Col" => "Columba",
        "Com" => "Coma Berenices",
        "CrA" => "Corona Australis",
        "CrB" => "Corona Borealis",
        "Crv" => "Corvus",
        "Crt" => "Crater",
        "Cru" => "Crux",
        "Cyg" => "Cygnus",
        "Del" => "Delphinus",
        "Dor" => "Dorado",
        "Dra" => "Draco",
        "Equ" => "Equuleus",
        "Eri" => "Eridanus",
        "For" => "Fornax",
        "Gem" => "Gemini",
        "Gru" => "Grus",
        "Her" => "Hercules",
        "Hor" => "Horologium",
        "Hya" => "Hydra",
        "Hyi" => "Hydrus",
        "Ind" => "Indus",
        "Lac" => "Lacerta",
        "Leo" => "Leo",
        "LMi" => "Leo Minor",
        "Lep" => "Lepus",
        "Lib" => "Libra",
        "Lup" => "Lupus",
        "Lyn" => "Lynx",
        "Lyr" => "Lyra",
        "Men" => "Mensa",
        "Mic" => "Microscopium",
        "Mon" => "Monoceros",
        "Mus" => "Musca",
        "Nor" => "Norma",
        "Oct" => "Octans",
        "Oph" => "Ophiuchus",
        "Ori" => "Orion",
        "Pav" => "Pavo",
        "Peg" => "Pegasus",
        "Per" => "Perseus",
        "Phe" => "Phoenix",
        "Pic" => "Pictor",
        "Psc" => "Pisces",
        "PsA" => "Piscis Austrinus",
        "Pup" => "Puppis",
        "Pyx" => "Pyxis",
        "Ret" => "Reticulum",
        "Sge" => "Sagitta",
        "Sgr" => "Sagittarius",
        "Sco" => "Scorpius",
        "Scl" => "Sculptor",
        "Sct" => "Scutum",
        "Ser" => "Serpens",
        "Sex" => "Sextans",
        "Tau" => "Taurus",
        "Tel" => "Telescopium",
        "Tri" => "Triangulum",
        "TrA" => "Triangulum Australe",
        "Tuc" => "Tucana",
        "UMa" => "Ursa Major",
        "UMi" => "Ursa Minor",
        "Vel" => "Vela",
        "Vir" => "Virgo",
        "Vol" => "Volans",
        "Vul" => "Vulpecula",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn brisbane() -> Observer {
        Observer::new(-27.47, 153.02)
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 22, 14, 0, 0).unwrap()
    }

    /// Crux, always up from Brisbane, plus a far-northern figure that
    /// never is.
    fn two_figure_set() -> ConstellationSet {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"id": "Cru", "type": "Feature", "geometry": {"type": "MultiLineString",
                    "coordinates": [[[186.65, -63.10], [191.93, -59.69]],
                                    [[187.79, -57.11], [183.79, -58.75]]]}},
                {"id": "UMi", "type": "Feature", "geometry": {"type": "MultiLineString",
                    "coordinates": [[[37.95, 89.26], [263.05, 86.59], [251.49, 82.04]]]}}
            ]
        }"#;
        let file: LineFile = serde_json::from_str(json).unwrap();
        ConstellationSet {
            features: file.features,
        }
    }

    #[test]
    fn southern_cross_projects_and_polaris_does_not() {
        let figures = two_figure_set().project(brisbane(), instant(), None, None);
        assert_eq!(figures.len(), 1);

        let crux = &figures[0];
        assert_eq!(crux.id, "Cru");
        assert!(!crux.polylines.is_empty());
        for polyline in &crux.polylines {
            for point in polyline {
                assert!((-180.0..=180.0).contains(&point[0]));
                assert!(point[1] > 0.0);
            }
        }
    }

    #[test]
    fn label_anchor_belongs_to_the_figure() {
        let figures = two_figure_set().project(brisbane(), instant(), None, None);
        let crux = &figures[0];
        let anchor = crux.label_anchor;
        assert!(
            crux.polylines
                .iter()
                .flatten()
                .any(|p| (p[0] - anchor[0]).abs() < 6.0 && (p[1] - anchor[1]).abs() < 6.0),
            "anchor {anchor:?} far from every figure point"
        );
    }

    #[test]
    fn id_filter_and_cap_apply() {
        let set = two_figure_set();
        let none = set.project(
            brisbane(),
            instant(),
            Some(&["UMi".to_string()]),
            None,
        );
        assert!(none.is_empty());

        let capped = set.project(brisbane(), instant(), None, Some(0));
        assert!(capped.is_empty());
    }

    #[test]
    fn negative_ra_is_normalized() {
        let json = r#"{"features": [
            {"id": "Cru", "geometry":
                {"coordinates": [[[-173.35, -63.10], [-168.07, -59.69]]]}}
        ]}"#;
        let file: LineFile = serde_json::from_str(json).unwrap();
        let set = ConstellationSet {
            features: file.features,
        };
        // -173.35° ≡ 186.65°: same figure as the positive-RA encoding.
        let shifted = set.project(brisbane(), instant(), None, None);
        let reference = two_figure_set().project(brisbane(), instant(), None, None);
        assert_eq!(shifted.len(), 1);
        let a = shifted[0].polylines[0][0];
        let b = reference[0].polylines[0][0];
        assert!((a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9);
    }

    #[test]
    fn loads_from_file_and_reports_missing_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"features": [{{"id": "Cru", "geometry": {{"coordinates": [[[186.65, -63.10], [191.93, -59.69]]]}}}}]}}"#
        )
        .unwrap();
        let set = ConstellationSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 1);

        assert!(matches!(
            ConstellationSet::load("/nonexistent/lines.json").unwrap_err(),
            ConstellationError::Io(_)
        ));
    }

    #[test]
    fn abbreviations_resolve_to_full_names() {
        assert_eq!(full_name("Cru"), Some("Crux"));
        assert_eq!(full_name("CMa"), Some("Canis Major"));
        assert_eq!(full_name("Nope"), None);
    }
}
