// Re-export key components
pub use crate::algo::{LineMerge, MergedChain, merge_lines};
pub use crate::filter::AttributeFilter;
pub use crate::leg::{FragmentationWarning, Leg, LegAssembler, LegChain, LegSpec};
pub use crate::loading::{
    CountyMerge, CountySource, merge_county_collections, read_collection, write_geojson,
};
pub use crate::projection::{MeasuredLine, MetricProjector, PlanarProjection, TransverseMercator};
pub use crate::select::{select_collection, select_features};
pub use crate::waypoints::{WaypointArea, filter_waypoints};

// Core data model
pub use crate::Error;
pub use crate::model::{EdgeCollection, EdgeFeature, EdgeId, SelectionCriterion};
