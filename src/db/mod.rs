//! Database access seam.
//!
//! Query operations only see the [`ConnectionFactory`] and
//! [`SpatialConnection`] traits. The PostgreSQL implementation lives in
//! [`postgres`]; tests substitute a recording fake.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::UpstreamError;

mod postgres;
mod query;

#[cfg(test)]
pub(crate) mod fake;

pub use postgres::{PgConnectionFactory, PoolSettings};
pub use query::{Param, SpatialQuery};

/// One result row, column name to JSON value.
pub type Row = Map<String, Value>;

/// Hands out one connection per request
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn SpatialConnection>, UpstreamError>;
}

/// A borrowed connection. Dropping it returns it to wherever it came from.
#[async_trait]
pub trait SpatialConnection: Send {
    async fn fetch_rows(&mut self, query: &SpatialQuery) -> Result<Vec<Row>, UpstreamError>;

    /// First row of the result, if any
    async fn fetch_one(&mut self, query: &SpatialQuery) -> Result<Option<Row>, UpstreamError> {
        Ok(self.fetch_rows(query).await?.into_iter().next())
    }
}
