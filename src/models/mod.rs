//! Request and response types for the query endpoints.

pub mod feature;
pub mod request;
pub mod response;

pub use feature::{Feature, FeatureCollection, Properties};
pub use request::{
    AreaRequest, BufferRequest, IntersectionRequest, IntersectsRequest, KnnRequest,
    PerimeterRequest, PipRequest, Source, TransformRequest, UnionRequest, WithinDistanceRequest,
};
pub use response::{AreaResponse, BufferResponse, HealthResponse, PerimeterResponse};
