//! Waypoint cleanup for the route area.

use geo::{Contains, Geometry, LineString, Point, Polygon};
use log::info;
use serde::Deserialize;

use crate::{EdgeCollection, EdgeFeature};

/// Area that waypoints have to fall into, as a lon/lat ring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaypointArea {
    pub ring: Vec<(f64, f64)>,
}

impl Default for WaypointArea {
    /// Lockhart Basin, San Juan County, Utah.
    fn default() -> Self {
        Self {
            ring: vec![
                (-109.790_220, 38.518_660),
                (-109.655_685, 38.485_290),
                (-109.649_959, 38.156_585),
                (-109.831_324, 38.148_435),
            ],
        }
    }
}

impl WaypointArea {
    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.ring.clone()), vec![])
    }
}

/// Keeps point features strictly inside `area`. If any feature of the input
/// has a `name` (or `nam`) property, kept features where it is null or absent
/// are dropped too.
pub fn filter_waypoints(collection: &EdgeCollection, area: &WaypointArea) -> EdgeCollection {
    let polygon = area.polygon();

    let keyed: Vec<&str> = ["name", "nam"]
        .into_iter()
        .filter(|key| collection.iter().any(|feature| feature.property(key).is_some()))
        .collect();

    let mut kept: Vec<&EdgeFeature> = collection
        .iter()
        .filter(|feature| point_of(feature).is_some_and(|point| polygon.contains(&point)))
        .collect();
    info!("Waypoints inside the area: {}", kept.len());

    for key in keyed {
        let before = kept.len();
        kept.retain(|feature| feature.property(key).is_some_and(|value| !value.is_null()));
        info!("Removed {} waypoints with {key}=null", before - kept.len());
    }

    kept.into_iter().cloned().collect()
}

fn point_of(feature: &EdgeFeature) -> Option<Point<f64>> {
    let geometry = feature.feature().geometry.as_ref()?;
    match Geometry::<f64>::try_from(geometry).ok()? {
        Geometry::Point(point) => Some(point),
        _ => None,
    }
}
