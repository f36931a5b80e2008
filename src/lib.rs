//! Geoquery - GeoJSON spatial query API over PostGIS
//!
//! Translates JSON requests into parameterized PostGIS queries and shapes the
//! results as GeoJSON for a Leaflet map client. All geometry work happens in
//! the database; this crate validates input, picks the statement, and adapts
//! the rows.

pub mod api;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod geojson;
pub mod models;

pub use config::AppConfig;
pub use dispatch::Dispatcher;
pub use error::{QueryError, UpstreamError};
pub use models::{Feature, FeatureCollection};
