//! Selection of leg edges by identifier and optional name.

use crate::{EdgeCollection, EdgeFeature, SelectionCriterion};

/// Returns the edges matching at least one criterion.
///
/// The result follows collection order, not criteria order, and holds each
/// edge once even if several criteria match it. Edges without an identifier
/// never match.
pub fn select_features<'a>(
    collection: &'a EdgeCollection,
    criteria: &[SelectionCriterion],
) -> Vec<&'a EdgeFeature> {
    collection
        .iter()
        .filter(|edge| criteria.iter().any(|criterion| criterion.matches(edge)))
        .collect()
}

/// Same as [`select_features`], cloning the matches into a new collection.
pub fn select_collection(
    collection: &EdgeCollection,
    criteria: &[SelectionCriterion],
) -> EdgeCollection {
    select_features(collection, criteria)
        .into_iter()
        .cloned()
        .collect()
}
