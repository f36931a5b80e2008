//! Point-based queries: point-in-polygon, distance search, buffer, KNN.

use serde_json::{json, Value};
use tracing::debug;

use super::{properties, sql, Dispatcher};
use crate::db::{Param, SpatialQuery};
use crate::error::QueryError;
use crate::geojson::{geometry_to_feature, rows_to_feature_collection, GEOMETRY_KEY};
use crate::models::{
    BufferRequest, BufferResponse, FeatureCollection, KnnRequest, PipRequest, Source,
    WithinDistanceRequest,
};

impl Dispatcher {
    /// Polygonal features that cover the point, boundary included
    pub async fn point_in_polygon(&self, req: PipRequest) -> Result<FeatureCollection, QueryError> {
        let (lon, lat) = match (req.lon, req.lat) {
            (Some(lon), Some(lat)) => (lon, lat),
            (lon, lat) => {
                return Err(QueryError::missing([
                    ("lon", lon.is_none()),
                    ("lat", lat.is_none()),
                ]))
            }
        };
        let source = Source::resolve(req.source.as_deref())?;
        let limit = req.limit.unwrap_or(PipRequest::DEFAULT_LIMIT);

        let query = SpatialQuery::new(sql::point_in_polygon(self.table(source)))
            .bind(Param::Float(lon))
            .bind(Param::Float(lat))
            .bind(Param::Int(limit));

        let rows = self.connect().await?.fetch_rows(&query).await?;
        let collection = rows_to_feature_collection(rows, GEOMETRY_KEY);

        debug!(
            "PIP at ({}, {}) on {:?}: {} feature(s)",
            lon,
            lat,
            source,
            collection.len()
        );
        Ok(collection)
    }

    /// Features within `radius_m` meters, nearest first
    pub async fn within_distance(
        &self,
        req: WithinDistanceRequest,
    ) -> Result<FeatureCollection, QueryError> {
        let (lon, lat, radius_m) = match (req.lon, req.lat, req.radius_m) {
            (Some(lon), Some(lat), Some(radius_m)) => (lon, lat, radius_m),
            (lon, lat, radius_m) => {
                return Err(QueryError::missing([
                    ("lon", lon.is_none()),
                    ("lat", lat.is_none()),
                    ("radius_m", radius_m.is_none()),
                ]))
            }
        };
        let limit = req.limit.unwrap_or(WithinDistanceRequest::DEFAULT_LIMIT);

        let query = SpatialQuery::new(sql::within_distance(&self.tables.features))
            .bind(Param::Float(lon))
            .bind(Param::Float(lat))
            .bind(Param::Float(radius_m))
            .bind(Param::Int(limit))
            .ordered_by("dist_m");

        let rows = self.connect().await?.fetch_rows(&query).await?;
        let collection = rows_to_feature_collection(rows, GEOMETRY_KEY);

        debug!(
            "Within {}m of ({}, {}): {} feature(s)",
            radius_m,
            lon,
            lat,
            collection.len()
        );
        Ok(collection)
    }

    /// Geodesic buffer around a point plus the features it intersects.
    ///
    /// Both statements run on the same connection.
    pub async fn buffer(&self, req: BufferRequest) -> Result<BufferResponse, QueryError> {
        let (lon, lat, buffer_m) = match (req.lon, req.lat, req.buffer_m) {
            (Some(lon), Some(lat), Some(buffer_m)) => (lon, lat, buffer_m),
            (lon, lat, buffer_m) => {
                return Err(QueryError::missing([
                    ("lon", lon.is_none()),
                    ("lat", lat.is_none()),
                    ("buffer_m", buffer_m.is_none()),
                ]))
            }
        };
        let limit = req.limit.unwrap_or(BufferRequest::DEFAULT_LIMIT);

        let buffer_query = SpatialQuery::new(sql::BUFFER_POLYGON)
            .bind(Param::Float(lon))
            .bind(Param::Float(lat))
            .bind(Param::Float(buffer_m));
        let hits_query = SpatialQuery::new(sql::buffer_hits(&self.tables.features))
            .bind(Param::Float(lon))
            .bind(Param::Float(lat))
            .bind(Param::Float(buffer_m))
            .bind(Param::Int(limit));

        let mut conn = self.connect().await?;
        let buffer_geometry = conn
            .fetch_one(&buffer_query)
            .await?
            .and_then(|mut row| row.remove(GEOMETRY_KEY))
            .unwrap_or(Value::Null);
        let rows = conn.fetch_rows(&hits_query).await?;
        drop(conn);

        let hits = rows_to_feature_collection(rows, GEOMETRY_KEY);
        debug!(
            "Buffer {}m at ({}, {}): {} hit(s)",
            buffer_m,
            lon,
            lat,
            hits.len()
        );

        Ok(BufferResponse {
            buffer: geometry_to_feature(
                buffer_geometry,
                Some(properties([("buffer_m", json!(buffer_m))])),
            ),
            hits,
        })
    }

    /// The `k` features nearest to the point
    pub async fn knn(&self, req: KnnRequest) -> Result<FeatureCollection, QueryError> {
        let (lon, lat) = match (req.lon, req.lat) {
            (Some(lon), Some(lat)) => (lon, lat),
            (lon, lat) => {
                return Err(QueryError::missing([
                    ("lon", lon.is_none()),
                    ("lat", lat.is_none()),
                ]))
            }
        };
        let k = req.k.unwrap_or(KnnRequest::DEFAULT_K);

        let query = SpatialQuery::new(sql::knn(&self.tables.features))
            .bind(Param::Float(lon))
            .bind(Param::Float(lat))
            .bind(Param::Int(k))
            .ordered_by("dist_m");

        let rows = self.connect().await?.fetch_rows(&query).await?;
        let collection = rows_to_feature_collection(rows, GEOMETRY_KEY);

        debug!("KNN k={} at ({}, {}): {} feature(s)", k, lon, lat, collection.len());
        Ok(collection)
    }
}
