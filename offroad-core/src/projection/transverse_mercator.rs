//! Forward transverse Mercator on the WGS84 ellipsoid.
//!
//! Uses Krüger's series in the third flattening `n`, truncated after the
//! third-order term. Within a UTM zone the error is well below a millimetre.

use geo::Coord;
use serde::{Deserialize, Serialize};

const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const WGS84_INVERSE_FLATTENING: f64 = 298.257_223_563;

pub(crate) const UTM_SCALE_FACTOR: f64 = 0.9996;
pub(crate) const UTM_FALSE_EASTING: f64 = 500_000.0;
pub(crate) const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transverse Mercator parameters. The latitude of origin is the equator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransverseMercator {
    /// Longitude of the central meridian, degrees
    pub central_meridian: f64,
    pub scale_factor: f64,
    /// Metres
    pub false_easting: f64,
    /// Metres
    pub false_northing: f64,
}

impl TransverseMercator {
    /// Projects a longitude/latitude pair in degrees to easting/northing in
    /// metres. Points on the equator 90 degrees from the central meridian
    /// project to infinity.
    pub fn forward(&self, lon: f64, lat: f64) -> Coord<f64> {
        let flattening = 1.0 / WGS84_INVERSE_FLATTENING;
        let n = flattening / (2.0 - flattening);
        let eccentricity = (flattening * (2.0 - flattening)).sqrt();
        let n2 = n * n;
        let n3 = n2 * n;

        let rectifying_radius =
            WGS84_SEMI_MAJOR_AXIS / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];

        let phi = lat.to_radians();
        let delta_lambda = (lon - self.central_meridian).to_radians();

        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - eccentricity * (eccentricity * sin_phi).atanh()).sinh();
        let xi = t.atan2(delta_lambda.cos());
        let eta = (delta_lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let (mut xi_sum, mut eta_sum) = (xi, eta);
        for (j, a) in alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_sum += a * (k * xi).sin() * (k * eta).cosh();
            eta_sum += a * (k * xi).cos() * (k * eta).sinh();
        }

        let scale = self.scale_factor * rectifying_radius;
        Coord {
            x: self.false_easting + scale * eta_sum,
            y: self.false_northing + scale * xi_sum,
        }
    }
}
