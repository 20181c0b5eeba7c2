use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::Error;
use crate::model::edge::collection_of;
use crate::projection::round_km;

use super::{Leg, LegChain};

impl Leg {
    /// Converts the leg to a `GeoJSON` `FeatureCollection` with one feature
    /// per chain, in geographic coordinates.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .chains
            .iter()
            .enumerate()
            .map(|(idx, chain)| self.chain_feature(idx, chain))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collection_of(features))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(&self.to_geojson()?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    fn chain_feature(&self, idx: usize, chain: &LegChain) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&chain.geometry));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "leg": self.name,
                "osmid_list": chain.osmids,
                "source_osmids": self.source_ids,
                "note": self.note,
                "length_km_utm": chain.length_km(),
                "leg_length_km": round_km(self.length_m()),
                "length_crs": self.projection.to_string(),
                "chain_index": idx,
                "chain_count": self.chains.len(),
                "fragmented": self.is_fragmented(),
            }
        });

        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
