//! Geodesic measurements of a client geometry.

use tracing::debug;

use super::{float_column, required_geometry, sql, Dispatcher};
use crate::db::{Param, SpatialQuery};
use crate::error::{QueryError, UpstreamError};
use crate::models::{AreaRequest, AreaResponse, PerimeterRequest, PerimeterResponse};

impl Dispatcher {
    pub async fn area(&self, req: AreaRequest) -> Result<AreaResponse, QueryError> {
        let geometry = required_geometry("geojson", req.geojson)?.require_present()?;

        let query = SpatialQuery::new(sql::AREA).bind(Param::Text(geometry.to_query_text()));
        let row = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .ok_or_else(|| UpstreamError::Driver("area query returned no row".to_string()))?;

        let response = AreaResponse::from_square_meters(float_column(&row, "area_m2")?);
        debug!("Area: {} m2", response.area_m2);
        Ok(response)
    }

    pub async fn perimeter(&self, req: PerimeterRequest) -> Result<PerimeterResponse, QueryError> {
        let geometry = required_geometry("geojson", req.geojson)?.require_present()?;

        let query =
            SpatialQuery::new(sql::PERIMETER).bind(Param::Text(geometry.to_query_text()));
        let row = self
            .connect()
            .await?
            .fetch_one(&query)
            .await?
            .ok_or_else(|| UpstreamError::Driver("perimeter query returned no row".to_string()))?;

        let response = PerimeterResponse::from_meters(float_column(&row, "perimeter_m")?);
        debug!("Perimeter: {} m", response.perimeter_m);
        Ok(response)
    }
}
