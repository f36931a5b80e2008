//! Response bodies that are not plain Features.

use serde::{Deserialize, Serialize};

use super::{Feature, FeatureCollection};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Buffer polygon plus the stored features it touches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferResponse {
    pub buffer: Feature,
    pub hits: FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaResponse {
    pub area_m2: f64,
    pub area_km2: f64,
}

impl AreaResponse {
    pub fn from_square_meters(area_m2: f64) -> Self {
        Self {
            area_m2,
            area_km2: area_m2 / 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerimeterResponse {
    pub perimeter_m: f64,
    pub perimeter_km: f64,
}

impl PerimeterResponse {
    pub fn from_meters(perimeter_m: f64) -> Self {
        Self {
            perimeter_m,
            perimeter_km: perimeter_m / 1000.0,
        }
    }
}
