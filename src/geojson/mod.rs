//! Geometry adapter.
//!
//! Normalizes client-supplied GeoJSON into a canonical geometry and shapes
//! database rows into Feature / FeatureCollection envelopes.

mod envelope;
mod geometry;

pub use envelope::{geometry_to_feature, rows_to_feature_collection, GEOMETRY_KEY};
pub use geometry::{parse_geometry, Geometry, GeometryError};
