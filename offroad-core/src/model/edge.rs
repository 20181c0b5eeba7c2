//! Road-network edges - identifiers, features and collections

use std::fmt;

use geo::{Geometry, LineString};
use geojson::{Feature, FeatureCollection, JsonValue};
use serde::{Deserialize, Serialize};

use crate::Error;

/// OSM way identifier of an edge.
///
/// Identifiers are compared strictly: the integer `42` and the string `"42"`
/// are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeId {
    Int(i64),
    Text(String),
}

impl EdgeId {
    /// Reads an identifier from a property value. Lists, floats, booleans and
    /// `null` are not identifiers.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(number) => number.as_i64().map(EdgeId::Int),
            JsonValue::String(text) => Some(EdgeId::Text(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeId::Int(id) => write!(f, "{id}"),
            EdgeId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EdgeId {
    fn from(id: i64) -> Self {
        EdgeId::Int(id)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        EdgeId::Text(id.to_owned())
    }
}

/// Single edge of the road network.
///
/// The `osmid` property is not unique: OSM way-splitting leaves several
/// physical segments carrying the same identifier.
#[derive(Debug, Clone)]
pub struct EdgeFeature {
    id: Option<EdgeId>,
    feature: Feature,
}

impl EdgeFeature {
    pub fn from_feature(feature: Feature) -> Self {
        let id = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("osmid"))
            .and_then(EdgeId::from_json);
        Self { id, feature }
    }

    pub fn id(&self) -> Option<&EdgeId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.tag("name")
    }

    /// Returns a string tag. Absent keys, `null` and non-string values all
    /// read as a missing tag.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(JsonValue::as_str)
    }

    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.feature.properties.as_ref().and_then(|props| props.get(key))
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn into_feature(self) -> Feature {
        self.feature
    }

    /// Linear parts of the edge geometry in input coordinate order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] when the geometry is missing, is not
    /// a (multi)line string, or contains a line with fewer than two vertices.
    pub fn lines(&self) -> Result<Vec<LineString<f64>>, Error> {
        let label = self
            .id
            .as_ref()
            .map_or_else(|| "without osmid".to_string(), |id| id.to_string());

        let geometry = self
            .feature
            .geometry
            .as_ref()
            .ok_or_else(|| Error::MalformedInput(format!("edge {label} has no geometry")))?;

        let geometry = Geometry::<f64>::try_from(geometry)
            .map_err(|e| Error::MalformedInput(format!("edge {label}: {e}")))?;

        let lines = match geometry {
            Geometry::LineString(line) => vec![line],
            Geometry::MultiLineString(lines) => lines.0,
            _ => {
                return Err(Error::MalformedInput(format!(
                    "edge {label} is not a linear geometry"
                )));
            }
        };

        if let Some(short) = lines.iter().find(|line| line.0.len() < 2) {
            return Err(Error::MalformedInput(format!(
                "edge {label} has a line with {} vertices",
                short.0.len()
            )));
        }

        Ok(lines)
    }
}

impl From<Feature> for EdgeFeature {
    fn from(feature: Feature) -> Self {
        Self::from_feature(feature)
    }
}

/// Ordered collection of edges read from one `FeatureCollection`.
#[derive(Debug, Clone, Default)]
pub struct EdgeCollection {
    features: Vec<EdgeFeature>,
}

impl EdgeCollection {
    pub fn new(features: Vec<EdgeFeature>) -> Self {
        Self { features }
    }

    /// Parses a `FeatureCollection` document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the value is not a
    /// `FeatureCollection`, has no `features` list, or one of its features
    /// cannot be parsed.
    pub fn from_json_value(value: JsonValue) -> Result<Self, Error> {
        let JsonValue::Object(mut object) = value else {
            return Err(Error::MalformedInput(
                "feature collection must be a JSON object".to_string(),
            ));
        };

        match object.get("type").and_then(JsonValue::as_str) {
            Some("FeatureCollection") => {}
            Some(other) => {
                return Err(Error::MalformedInput(format!(
                    "expected a FeatureCollection, got {other}"
                )));
            }
            None => {
                return Err(Error::MalformedInput(
                    "document has no type member".to_string(),
                ));
            }
        }

        let items = match object.remove("features") {
            Some(JsonValue::Array(items)) => items,
            Some(_) => {
                return Err(Error::MalformedInput(
                    "features member is not a list".to_string(),
                ));
            }
            None => {
                return Err(Error::MalformedInput(
                    "feature collection is missing a features list".to_string(),
                ));
            }
        };

        let features = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                Feature::from_json_value(item)
                    .map(EdgeFeature::from_feature)
                    .map_err(|e| Error::MalformedInput(format!("feature {idx}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { features })
    }

    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for invalid JSON or a malformed
    /// collection.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let value: JsonValue = serde_json::from_str(input)
            .map_err(|e| Error::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_json_value(value)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeFeature> {
        self.features.iter()
    }

    pub fn features(&self) -> &[EdgeFeature] {
        &self.features
    }

    /// Appends all edges of `other`, keeping duplicates.
    pub fn extend(&mut self, other: EdgeCollection) {
        self.features.extend(other.features);
    }

    pub fn to_geojson(&self) -> FeatureCollection {
        collection_of(self.features.iter().map(|edge| edge.feature.clone()))
    }

    pub fn into_geojson(self) -> FeatureCollection {
        collection_of(self.features.into_iter().map(EdgeFeature::into_feature))
    }
}

impl FromIterator<EdgeFeature> for EdgeCollection {
    fn from_iter<I: IntoIterator<Item = EdgeFeature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EdgeCollection {
    type Item = &'a EdgeFeature;
    type IntoIter = std::slice::Iter<'a, EdgeFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

pub(crate) fn collection_of(features: impl IntoIterator<Item = Feature>) -> FeatureCollection {
    FeatureCollection {
        features: features.into_iter().collect(),
        bbox: None,
        foreign_members: None,
    }
}
