//! Geometry algorithms used to assemble legs.

pub mod linemerge;

pub use linemerge::{LineMerge, MergedChain, merge_lines};
