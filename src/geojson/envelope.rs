//! Shaping database output into GeoJSON envelopes.

use serde_json::Value;

use crate::db::Row;
use crate::models::{Feature, FeatureCollection, Properties};

/// Column every feature-returning query aliases its `ST_AsGeoJSON` output to.
pub const GEOMETRY_KEY: &str = "geom_geojson";

/// Turn result rows into a FeatureCollection.
///
/// The `geometry_key` column becomes the geometry and the rest of the row the
/// properties. Rows without a geometry are dropped. Row order is kept.
pub fn rows_to_feature_collection(rows: Vec<Row>, geometry_key: &str) -> FeatureCollection {
    let features = rows
        .into_iter()
        .filter_map(|mut row| match row.remove(geometry_key) {
            None | Some(Value::Null) => None,
            Some(geometry) => Some(Feature {
                geometry,
                properties: row,
            }),
        })
        .collect();

    FeatureCollection { features }
}

/// Wrap one GeoJSON geometry value into a Feature.
pub fn geometry_to_feature(geometry: Value, properties: Option<Properties>) -> Feature {
    Feature {
        geometry,
        properties: properties.unwrap_or_default(),
    }
}
