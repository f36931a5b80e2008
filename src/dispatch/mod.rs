//! Query dispatcher.
//!
//! One method per endpoint. Each validates its request, binds client values as
//! parameters of a PostGIS statement, runs it on a single borrowed connection
//! and shapes the rows into GeoJSON.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{TableName, Tables};
use crate::db::{ConnectionFactory, Row, SpatialConnection};
use crate::error::{QueryError, UpstreamError};
use crate::geojson::{parse_geometry, Geometry};
use crate::models::{Properties, Source};

mod measure;
mod overlay;
mod proximity;
pub mod sql;

/// Holds the startup configuration every operation needs.
#[derive(Clone)]
pub struct Dispatcher {
    tables: Tables,
    connections: Arc<dyn ConnectionFactory>,
}

impl Dispatcher {
    pub fn new(tables: Tables, connections: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            tables,
            connections,
        }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    fn table(&self, source: Source) -> &TableName {
        match source {
            Source::Features => &self.tables.features,
            Source::Regions => &self.tables.regions,
        }
    }

    async fn connect(&self) -> Result<Box<dyn SpatialConnection>, QueryError> {
        Ok(self.connections.acquire().await?)
    }
}

/// Parse a required geometry field.
fn required_geometry(field: &'static str, value: Option<Value>) -> Result<Geometry, QueryError> {
    let value = value.ok_or_else(|| QueryError::MissingParameter(vec![field]))?;
    Ok(parse_geometry(&value)?)
}

fn float_column(row: &Row, column: &str) -> Result<f64, QueryError> {
    row.get(column).and_then(Value::as_f64).ok_or_else(|| {
        UpstreamError::Driver(format!("column '{}' missing or not numeric", column)).into()
    })
}

fn properties<I, K>(pairs: I) -> Properties
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
pub(crate) fn test_dispatcher(fake: &crate::db::fake::FakeConnections) -> Dispatcher {
    Dispatcher::new(Tables::default(), Arc::new(fake.clone()))
}
