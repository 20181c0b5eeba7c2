//! Data model for road-network edges and leg selection
//!
//! Edges are kept as the GeoJSON features they were read from so that
//! selections can be written back out without losing any property.

pub mod criterion;
pub mod edge;

pub use criterion::SelectionCriterion;
pub use edge::{EdgeCollection, EdgeFeature, EdgeId};
