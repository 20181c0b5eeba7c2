//! Planar reprojection and metric length of geographic geometries.
//!
//! Input coordinates are WGS84 longitude/latitude in degrees. Lengths are
//! always measured in the planar system; there is no fallback to degree-based
//! distances when projecting fails.

mod transverse_mercator;

use std::fmt;
use std::str::FromStr;

use geo::{Coord, Euclidean, Length, LineString, MapCoords};
use serde::Deserialize;

use crate::Error;
pub use transverse_mercator::TransverseMercator;
use transverse_mercator::{UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_SCALE_FACTOR};

const EPSG_UTM_NORTH_BASE: u32 = 32600;
const EPSG_UTM_SOUTH_BASE: u32 = 32700;

/// Planar coordinate system used for measuring.
///
/// Deserializes from an EPSG code string such as `"EPSG:32612"` or from a
/// table of explicit transverse Mercator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "ProjectionRepr")]
pub enum PlanarProjection {
    /// WGS84 / UTM zone
    Utm { zone: u8, south: bool },
    TransverseMercator(TransverseMercator),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectionRepr {
    Code(String),
    TransverseMercator(TransverseMercator),
}

impl TryFrom<ProjectionRepr> for PlanarProjection {
    type Error = Error;

    fn try_from(repr: ProjectionRepr) -> Result<Self, Self::Error> {
        match repr {
            ProjectionRepr::Code(code) => code.parse(),
            ProjectionRepr::TransverseMercator(tm) => Ok(PlanarProjection::TransverseMercator(tm)),
        }
    }
}

impl Default for PlanarProjection {
    /// UTM zone 12N, covering south-eastern Utah.
    fn default() -> Self {
        PlanarProjection::Utm {
            zone: 12,
            south: false,
        }
    }
}

impl PlanarProjection {
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCrs`] for zones outside 1..=60.
    pub fn utm(zone: u8, south: bool) -> Result<Self, Error> {
        if (1..=60).contains(&zone) {
            Ok(PlanarProjection::Utm { zone, south })
        } else {
            Err(Error::UnsupportedCrs(format!("UTM zone {zone}")))
        }
    }

    /// Resolves a numeric EPSG code. Only the WGS84 / UTM families
    /// (326xx north, 327xx south) are supported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCrs`] for any other code.
    pub fn from_epsg(code: u32) -> Result<Self, Error> {
        let unsupported = || Error::UnsupportedCrs(format!("EPSG:{code}"));
        let (base, south) = match code {
            32601..=32660 => (EPSG_UTM_NORTH_BASE, false),
            32701..=32760 => (EPSG_UTM_SOUTH_BASE, true),
            _ => return Err(unsupported()),
        };
        let zone = u8::try_from(code - base).map_err(|_| unsupported())?;
        Self::utm(zone, south)
    }

    pub fn parameters(&self) -> TransverseMercator {
        match *self {
            PlanarProjection::Utm { zone, south } => TransverseMercator {
                central_meridian: -183.0 + 6.0 * f64::from(zone),
                scale_factor: UTM_SCALE_FACTOR,
                false_easting: UTM_FALSE_EASTING,
                false_northing: if south { UTM_FALSE_NORTHING_SOUTH } else { 0.0 },
            },
            PlanarProjection::TransverseMercator(tm) => tm,
        }
    }
}

impl FromStr for PlanarProjection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("EPSG:"))
            .map_or(trimmed, |_| &trimmed[5..]);
        let code = digits
            .parse::<u32>()
            .map_err(|_| Error::UnsupportedCrs(s.to_string()))?;
        Self::from_epsg(code)
    }
}

impl fmt::Display for PlanarProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanarProjection::Utm { zone, south } => {
                let base = if *south {
                    EPSG_UTM_SOUTH_BASE
                } else {
                    EPSG_UTM_NORTH_BASE
                };
                write!(f, "EPSG:{}", base + u32::from(*zone))
            }
            PlanarProjection::TransverseMercator(tm) => write!(
                f,
                "+proj=tmerc +lon_0={} +k={} +x_0={} +y_0={} +ellps=WGS84",
                tm.central_meridian, tm.scale_factor, tm.false_easting, tm.false_northing
            ),
        }
    }
}

/// Line reprojected to the planar system with its length.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLine {
    pub projected: LineString<f64>,
    pub length_m: f64,
}

/// Reprojects geographic lines and measures them in metres.
#[derive(Debug, Clone, Copy)]
pub struct MetricProjector {
    projection: PlanarProjection,
    parameters: TransverseMercator,
}

impl MetricProjector {
    pub fn new(projection: PlanarProjection) -> Self {
        Self {
            projection,
            parameters: projection.parameters(),
        }
    }

    pub fn projection(&self) -> PlanarProjection {
        self.projection
    }

    /// # Errors
    ///
    /// Returns [`Error::Projection`] for coordinates outside the valid
    /// longitude/latitude range or that cannot be projected.
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, Error> {
        let Coord { x: lon, y: lat } = coord;
        if !(lon.is_finite() && lat.is_finite())
            || !(-180.0..=180.0).contains(&lon)
            || !(-90.0..=90.0).contains(&lat)
        {
            return Err(Error::Projection(format!(
                "({lon}, {lat}) is not a geographic coordinate"
            )));
        }

        let projected = self.parameters.forward(lon, lat);
        if projected.x.is_finite() && projected.y.is_finite() {
            Ok(projected)
        } else {
            Err(Error::Projection(format!(
                "({lon}, {lat}) cannot be projected to {}",
                self.projection
            )))
        }
    }

    /// # Errors
    ///
    /// See [`MetricProjector::project_coord`].
    pub fn project_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, Error> {
        line.try_map_coords(|coord| self.project_coord(coord))
    }

    /// Sum of Euclidean segment lengths in the planar system.
    ///
    /// # Errors
    ///
    /// See [`MetricProjector::project_coord`].
    pub fn measure(&self, line: &LineString<f64>) -> Result<MeasuredLine, Error> {
        let projected = self.project_line(line)?;
        let length_m = Euclidean.length(&projected);
        Ok(MeasuredLine {
            projected,
            length_m,
        })
    }

    /// # Errors
    ///
    /// See [`MetricProjector::project_coord`].
    pub fn length_m(&self, line: &LineString<f64>) -> Result<f64, Error> {
        self.measure(line).map(|measured| measured.length_m)
    }
}

/// Converts metres to kilometres rounded to two decimals.
pub fn round_km(length_m: f64) -> f64 {
    (length_m / 1000.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use geo::{Distance, Haversine, Point, line_string};

    use super::*;

    #[test]
    fn parses_utm_epsg_codes() {
        assert_eq!(
            "EPSG:32612".parse::<PlanarProjection>().unwrap(),
            PlanarProjection::Utm {
                zone: 12,
                south: false
            }
        );
        assert_eq!(
            "epsg:32733".parse::<PlanarProjection>().unwrap(),
            PlanarProjection::Utm {
                zone: 33,
                south: true
            }
        );
        assert_eq!(
            "32612".parse::<PlanarProjection>().unwrap(),
            PlanarProjection::default()
        );
    }

    #[test]
    fn rejects_unsupported_codes() {
        for code in ["EPSG:3857", "EPSG:4326", "EPSG:32600", "EPSG:32661", "UTM"] {
            assert!(
                matches!(code.parse::<PlanarProjection>(), Err(Error::UnsupportedCrs(_))),
                "{code} should be unsupported"
            );
        }
        assert!(PlanarProjection::utm(0, false).is_err());
    }

    #[test]
    fn display_round_trips_utm_codes() {
        let projection = PlanarProjection::from_epsg(32712).unwrap();
        assert_eq!(projection.to_string(), "EPSG:32712");
    }

    #[test]
    fn utm_zone_parameters() {
        let tm = PlanarProjection::default().parameters();
        assert_eq!(tm.central_meridian, -111.0);
        assert_eq!(tm.false_northing, 0.0);

        let south = PlanarProjection::utm(12, true).unwrap().parameters();
        assert_eq!(south.false_northing, 10_000_000.0);
    }

    #[test]
    fn deserializes_from_code_or_parameters() {
        let projection: PlanarProjection = serde_json::from_str(r#""EPSG:32613""#).unwrap();
        assert_eq!(projection, PlanarProjection::utm(13, false).unwrap());

        let projection: PlanarProjection = serde_json::from_str(
            r#"{"central_meridian": -109.5, "scale_factor": 0.9999,
                "false_easting": 0.0, "false_northing": 0.0}"#,
        )
        .unwrap();
        assert_eq!(projection.parameters().central_meridian, -109.5);

        assert!(serde_json::from_str::<PlanarProjection>(r#""EPSG:3857""#).is_err());
    }

    #[test]
    fn length_is_close_to_geodesic_length() {
        let projector = MetricProjector::new(PlanarProjection::default());
        let line = line_string![(x: -109.80, y: 38.30), (x: -109.70, y: 38.35)];

        let planar = projector.length_m(&line).unwrap();
        let haversine = Haversine.distance(Point::new(-109.80, 38.30), Point::new(-109.70, 38.35));

        assert!((planar - haversine).abs() / haversine < 0.005);
    }

    #[test]
    fn length_does_not_depend_on_direction() {
        let projector = MetricProjector::new(PlanarProjection::default());
        let line = line_string![
            (x: -109.79, y: 38.51),
            (x: -109.70, y: 38.40),
            (x: -109.66, y: 38.16),
            (x: -109.83, y: 38.15)
        ];
        let mut reversed = line.clone();
        reversed.0.reverse();

        let forward = projector.length_m(&line).unwrap();
        let backward = projector.length_m(&reversed).unwrap();

        assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn invalid_coordinates_fail_instead_of_measuring_degrees() {
        let projector = MetricProjector::new(PlanarProjection::default());
        let line = line_string![(x: 500_000.0, y: 4_200_000.0), (x: 500_100.0, y: 4_200_000.0)];

        assert!(matches!(projector.measure(&line), Err(Error::Projection(_))));

        let diverging = line_string![(x: -21.0, y: 0.0), (x: -20.0, y: 0.0)];
        assert!(matches!(projector.measure(&diverging), Err(Error::Projection(_))));
    }

    #[test]
    fn rounds_to_two_decimal_kilometres() {
        assert_eq!(round_km(12_346.0), 12.35);
        assert_eq!(round_km(12_344.9), 12.34);
        assert_eq!(round_km(0.0), 0.0);
    }
}
