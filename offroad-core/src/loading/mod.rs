//! This module is responsible for reading and writing GeoJSON collections
//! and for building the working collection out of county exports.

mod counties;
mod files;

pub use counties::{CountyMerge, CountySource, merge_county_collections};
pub use files::{read_collection, read_json, write_geojson};
