//! Request bodies, one struct per endpoint.
//!
//! Required fields are still `Option` so that an absent field surfaces as a
//! named `MissingParameter` error rather than a generic decode failure.
//! A field of the wrong JSON type fails body decoding instead.

use serde::Deserialize;
use serde_json::Value;

use crate::error::QueryError;

/// Which stored table a query runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    Features,
    Regions,
}

impl Source {
    /// Resolve the optional `source` field. Matching is case-insensitive and an
    /// absent or empty value means `features`.
    pub fn resolve(raw: Option<&str>) -> Result<Self, QueryError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Source::Features),
            Some(s) if s.eq_ignore_ascii_case("features") => Ok(Source::Features),
            Some(s) if s.eq_ignore_ascii_case("regions") => Ok(Source::Regions),
            Some(other) => Err(QueryError::InvalidParameter {
                field: "source",
                reason: format!("expected 'features' or 'regions', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipRequest {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

impl PipRequest {
    pub const DEFAULT_LIMIT: i64 = 200;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntersectsRequest {
    pub geojson: Option<Value>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

impl IntersectsRequest {
    pub const DEFAULT_LIMIT: i64 = 500;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithinDistanceRequest {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub radius_m: Option<f64>,
    pub limit: Option<i64>,
}

impl WithinDistanceRequest {
    pub const DEFAULT_LIMIT: i64 = 500;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BufferRequest {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub buffer_m: Option<f64>,
    pub limit: Option<i64>,
}

impl BufferRequest {
    pub const DEFAULT_LIMIT: i64 = 1000;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaRequest {
    pub geojson: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerimeterRequest {
    pub geojson: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnnRequest {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub k: Option<i64>,
}

impl KnnRequest {
    pub const DEFAULT_K: i64 = 10;
}

/// Union either stored regions by id or an ad hoc list of geometries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnionRequest {
    pub region_ids: Option<Vec<i64>>,
    pub geoms: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntersectionRequest {
    pub a: Option<Value>,
    pub b: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformRequest {
    pub geojson: Option<Value>,
    pub to_epsg: Option<i32>,
}

impl TransformRequest {
    /// Web Mercator
    pub const DEFAULT_EPSG: i32 = 3857;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_resolution() {
        assert_eq!(Source::resolve(None).unwrap(), Source::Features);
        assert_eq!(Source::resolve(Some("")).unwrap(), Source::Features);
        assert_eq!(Source::resolve(Some("Regions")).unwrap(), Source::Regions);
        assert_eq!(Source::resolve(Some("FEATURES")).unwrap(), Source::Features);
        assert!(matches!(
            Source::resolve(Some("buildings")),
            Err(QueryError::InvalidParameter { field: "source", .. })
        ));
    }

    #[test]
    fn test_absent_fields_decode_as_none() {
        let req: PipRequest = serde_json::from_value(json!({"lon": 30.3})).unwrap();
        assert_eq!(req.lon, Some(30.3));
        assert!(req.lat.is_none());
        assert!(req.limit.is_none());
    }

    #[test]
    fn test_null_geojson_is_absent() {
        let req: AreaRequest = serde_json::from_value(json!({"geojson": null})).unwrap();
        assert!(req.geojson.is_none());
    }

    #[test]
    fn test_wrong_type_fails_decoding() {
        let res: Result<KnnRequest, _> = serde_json::from_value(json!({"lon": "east", "lat": 1.0}));
        assert!(res.is_err());
    }

    #[test]
    fn test_union_accepts_either_form() {
        let by_ids: UnionRequest = serde_json::from_value(json!({"region_ids": [1, 2]})).unwrap();
        assert_eq!(by_ids.region_ids, Some(vec![1, 2]));
        assert!(by_ids.geoms.is_none());

        let by_geoms: UnionRequest =
            serde_json::from_value(json!({"geoms": [{"type": "Point", "coordinates": [0, 0]}]}))
                .unwrap();
        assert_eq!(by_geoms.geoms.map(|g| g.len()), Some(1));
    }
}
