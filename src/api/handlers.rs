//! Request handlers. Each decodes its typed body and hands off to the dispatcher.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, response::Json};

use super::AppState;
use crate::error::QueryError;
use crate::models::*;

type Body<T> = Result<Json<T>, JsonRejection>;

/// Liveness only; does not touch the database
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn pip_handler(
    State(state): State<Arc<AppState>>,
    body: Body<PipRequest>,
) -> Result<Json<FeatureCollection>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.point_in_polygon(req).await?))
}

pub async fn intersects_handler(
    State(state): State<Arc<AppState>>,
    body: Body<IntersectsRequest>,
) -> Result<Json<FeatureCollection>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.intersects(req).await?))
}

pub async fn within_distance_handler(
    State(state): State<Arc<AppState>>,
    body: Body<WithinDistanceRequest>,
) -> Result<Json<FeatureCollection>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.within_distance(req).await?))
}

pub async fn buffer_handler(
    State(state): State<Arc<AppState>>,
    body: Body<BufferRequest>,
) -> Result<Json<BufferResponse>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.buffer(req).await?))
}

pub async fn area_handler(
    State(state): State<Arc<AppState>>,
    body: Body<AreaRequest>,
) -> Result<Json<AreaResponse>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.area(req).await?))
}

pub async fn perimeter_handler(
    State(state): State<Arc<AppState>>,
    body: Body<PerimeterRequest>,
) -> Result<Json<PerimeterResponse>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.perimeter(req).await?))
}

pub async fn knn_handler(
    State(state): State<Arc<AppState>>,
    body: Body<KnnRequest>,
) -> Result<Json<FeatureCollection>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.knn(req).await?))
}

pub async fn union_handler(
    State(state): State<Arc<AppState>>,
    body: Body<UnionRequest>,
) -> Result<Json<Feature>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.union(req).await?))
}

pub async fn intersection_handler(
    State(state): State<Arc<AppState>>,
    body: Body<IntersectionRequest>,
) -> Result<Json<Feature>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.intersection(req).await?))
}

/// Returned geometry stays in EPSG:4326; the projected one is in properties
pub async fn transform_handler(
    State(state): State<Arc<AppState>>,
    body: Body<TransformRequest>,
) -> Result<Json<Feature>, QueryError> {
    let Json(req) = body?;
    Ok(Json(state.dispatcher.transform(req).await?))
}
