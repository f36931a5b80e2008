//! GeoJSON output envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column-name to value mapping for one result row or feature.
pub type Properties = Map<String, Value>;

/// A single GeoJSON Feature. `geometry` is `null` when there is nothing to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Value,
    pub properties: Properties,
}

/// Ordered sequence of Features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
