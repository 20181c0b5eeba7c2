//! Assembly of drivable off-road legs from OSM road-network edges.
//!
//! Edges are selected by identifier (and optionally name), joined into
//! maximal chains wherever their endpoints coincide exactly, and measured in
//! a planar projection.

pub mod algo;
pub mod error;
pub mod filter;
pub mod leg;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod select;
pub mod waypoints;

pub use error::Error;
pub use filter::AttributeFilter;
pub use leg::{FragmentationWarning, Leg, LegAssembler, LegChain, LegSpec};
pub use model::{EdgeCollection, EdgeFeature, EdgeId, SelectionCriterion};
pub use projection::{MetricProjector, PlanarProjection};
