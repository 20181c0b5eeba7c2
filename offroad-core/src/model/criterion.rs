use serde::{Deserialize, Serialize};

use super::{EdgeFeature, EdgeId};

/// Target of a leg selection: an edge identifier with an optional exact name.
///
/// Without a name every edge carrying the identifier matches. With a name both
/// identifier and name have to match; the name comparison is case-sensitive
/// and does not normalize whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCriterion {
    #[serde(rename = "osmid")]
    pub id: EdgeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SelectionCriterion {
    pub fn new(id: EdgeId, name: Option<String>) -> Self {
        Self { id, name }
    }

    pub fn osmid(id: i64) -> Self {
        Self::new(EdgeId::Int(id), None)
    }

    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self::new(EdgeId::Int(id), Some(name.into()))
    }

    pub fn matches(&self, edge: &EdgeFeature) -> bool {
        edge.id() == Some(&self.id)
            && self
                .name
                .as_deref()
                .is_none_or(|name| edge.name() == Some(name))
    }
}
