//! Operations on client geometries: intersects, union, intersection, transform.

use serde_json::{json, Value};
use tracing::debug;

use super::{float_column, properties, required_geometry, sql, Dispatcher};
use crate::db::{Param, SpatialQuery};
use crate::error::{QueryError, UpstreamError};
use crate::geojson::{
    geometry_to_feature, parse_geometry, rows_to_feature_collection, GEOMETRY_KEY,
};
use crate::models::{
    Feature, FeatureCollection, IntersectionRequest, IntersectsRequest, Source, TransformRequest,
    UnionRequest,
};

impl Dispatcher {
    /// Stored features intersecting the client geometry
    pub async fn intersects(&self, req: IntersectsRequest) -> Result<FeatureCollection, QueryError> {
        let geometry = required_geometry("geojson", req.geojson)?.require_present()?;
        let source = Source::resolve(req.source.as_deref())?;
        let limit = req.limit.unwrap_or(IntersectsRequest::DEFAULT_LIMIT);

        let query = SpatialQuery::new(sql::intersects(self.table(source)))
            .bind(Param::Text(geometry.to_query_text()))
            .bind(Param::Int(limit));

        let rows = self.connect().await?.fetch_rows(&query).await?;
        let collection = rows_to_feature_collection(rows, GEOMETRY_KEY);

        debug!("Intersects on {:?}: {} feature(s)", source, collection.len());
        Ok(collection)
    }

    /// Union of stored regions by id, or of client geometries.
    ///
    /// Non-empty `region_ids` wins over `geoms`. An empty `region_ids` with no
    /// usable `geoms` is a not-found; supplying neither is a missing parameter.
    pub async fn union(&self, req: UnionRequest) -> Result<Feature, QueryError> {
        match (req.region_ids, req.geoms) {
            (Some(ids), _) if !ids.is_empty() => self.union_regions(ids).await,
            (_, Some(geoms)) if !geoms.is_empty() => self.union_geometries(geoms).await,
            (Some(_), _) => Err(no_regions_found()),
            _ => Err(QueryError::MissingParameter(vec!["region_ids", "geoms"])),
        }
    }

    async fn union_regions(&self, region_ids: Vec<i64>) -> Result<Feature, QueryError> {
        let query = SpatialQuery::new(sql::union_regions(&self.tables.regions))
            .bind(Param::IntArray(region_ids.clone()));

        let geometry = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .and_then(|mut row| row.remove(GEOMETRY_KEY))
            .filter(|geometry| !geometry.is_null())
            .ok_or_else(no_regions_found)?;

        debug!("Union of {} region id(s)", region_ids.len());
        Ok(geometry_to_feature(
            geometry,
            Some(properties([
                ("source", json!("regions")),
                ("region_ids", json!(region_ids)),
            ])),
        ))
    }

    async fn union_geometries(&self, geoms: Vec<Value>) -> Result<Feature, QueryError> {
        let texts = geoms
            .iter()
            .map(|value| -> Result<String, QueryError> {
                let geometry = parse_geometry(value)?.require_present()?;
                Ok(geometry.to_query_text().unwrap_or_default())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let count = texts.len();

        let query = SpatialQuery::new(sql::UNION_GEOMETRIES).bind(Param::TextArray(texts));
        let geometry = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .and_then(|mut row| row.remove(GEOMETRY_KEY))
            .unwrap_or(Value::Null);

        debug!("Union of {} client geometries", count);
        Ok(geometry_to_feature(
            geometry,
            Some(properties([
                ("source", json!("geoms")),
                ("count", json!(count)),
            ])),
        ))
    }

    /// Intersection of `a` and `b` with its geodesic area.
    ///
    /// An empty intersection is not an error: the Feature has a null geometry
    /// and zero area.
    pub async fn intersection(&self, req: IntersectionRequest) -> Result<Feature, QueryError> {
        let (a, b) = match (req.a, req.b) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                return Err(QueryError::missing([
                    ("a", a.is_none()),
                    ("b", b.is_none()),
                ]))
            }
        };
        let a = parse_geometry(&a)?;
        let b = parse_geometry(&b)?;

        let query = SpatialQuery::new(sql::INTERSECTION)
            .bind(Param::Text(a.to_query_text()))
            .bind(Param::Text(b.to_query_text()));

        let mut row = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .ok_or_else(|| UpstreamError::Driver("intersection query returned no row".to_string()))?;

        let geometry = row.remove(GEOMETRY_KEY).unwrap_or(Value::Null);
        let area_m2 = if geometry.is_null() {
            0.0
        } else {
            float_column(&row, "area_m2")?
        };

        debug!("Intersection area: {} m2", area_m2);
        Ok(geometry_to_feature(
            geometry,
            Some(properties([("area_m2", json!(area_m2))])),
        ))
    }

    /// Reproject a geometry to `to_epsg`.
    ///
    /// The Feature geometry stays in EPSG:4326 so a map can draw it; the
    /// projected geometry is returned in `properties.geom_transformed`.
    pub async fn transform(&self, req: TransformRequest) -> Result<Feature, QueryError> {
        let geometry = required_geometry("geojson", req.geojson)?.require_present()?;
        let to_epsg = req.to_epsg.unwrap_or(TransformRequest::DEFAULT_EPSG);

        let query = SpatialQuery::new(sql::TRANSFORM)
            .bind(Param::Text(geometry.to_query_text()))
            .bind(Param::Int4(to_epsg));

        let mut row = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .ok_or_else(|| UpstreamError::Driver("transform query returned no row".to_string()))?;

        let wgs84 = row.remove("geom_wgs84").unwrap_or(Value::Null);
        let transformed = row.remove("geom_transformed").unwrap_or(Value::Null);

        debug!("Transformed geometry to EPSG:{}", to_epsg);
        Ok(geometry_to_feature(
            wgs84,
            Some(properties([
                ("to_epsg", json!(to_epsg)),
                ("geom_transformed", transformed),
            ])),
        ))
    }
}

fn no_regions_found() -> QueryError {
    QueryError::NotFound("No geometries found for given region_ids".to_string())
}
