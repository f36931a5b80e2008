//! Input geometry normalization.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("geometry is required")]
    Missing,
    #[error("geometry string is not valid JSON: {0}")]
    Undecodable(#[from] serde_json::Error),
    #[error("GeoJSON must be an object with a 'type' field")]
    NotAnObject,
    #[error("GeoJSON object has no 'type' field")]
    MissingType,
    #[error("feature has no geometry")]
    NullGeometry,
}

/// A GeoJSON geometry as received from a client.
///
/// Coordinates are not validated here; the spatial engine rejects malformed
/// input when it parses the geometry. The wrapped value is `null` when it was
/// taken from a Feature without a geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Geometry(Value);

impl Geometry {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Reject a null geometry for operations that need an actual shape.
    pub fn require_present(self) -> Result<Self, GeometryError> {
        if self.is_null() {
            Err(GeometryError::NullGeometry)
        } else {
            Ok(self)
        }
    }

    /// GeoJSON text to bind as a query parameter; `None` binds SQL NULL.
    pub fn to_query_text(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.0.to_string())
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Normalize a Geometry, a Feature, or a JSON string holding either.
///
/// For a Feature the embedded `geometry` is returned, which may be null.
pub fn parse_geometry(input: &Value) -> Result<Geometry, GeometryError> {
    let decoded;
    let object = match input {
        Value::Null => return Err(GeometryError::Missing),
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text)?;
            &decoded
        }
        other => other,
    };

    let map = object.as_object().ok_or(GeometryError::NotAnObject)?;
    let kind = map.get("type").ok_or(GeometryError::MissingType)?;

    if kind.as_str() == Some("Feature") {
        let geometry = map.get("geometry").cloned().unwrap_or(Value::Null);
        return Ok(Geometry(geometry));
    }

    Ok(Geometry(object.clone()))
}
