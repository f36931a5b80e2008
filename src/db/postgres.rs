//! PostgreSQL / PostGIS connection factory backed by an sqlx pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Postgres;
use tracing::{debug, info};

use super::{ConnectionFactory, Param, Row, SpatialConnection, SpatialQuery};
use crate::error::UpstreamError;

/// Pool sizing
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct PgConnectionFactory {
    pool: PgPool,
}

impl PgConnectionFactory {
    /// Build the pool without opening a connection yet. Only the URL is
    /// checked here; an unreachable server shows up on first acquire.
    pub fn connect_lazy(database_url: &str, settings: &PoolSettings) -> Result<Self, UpstreamError> {
        info!(
            "Creating PostgreSQL pool (max_connections={}, acquire_timeout={:?})",
            settings.max_connections, settings.acquire_timeout
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    async fn acquire(&self) -> Result<Box<dyn SpatialConnection>, UpstreamError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSpatialConnection { conn }))
    }
}

struct PgSpatialConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl SpatialConnection for PgSpatialConnection {
    async fn fetch_rows(&mut self, query: &SpatialQuery) -> Result<Vec<Row>, UpstreamError> {
        let sql = json_rows_sql(query);
        debug!("Executing spatial query with {} parameter(s)", query.params.len());

        let mut statement = sqlx::query_scalar::<Postgres, Json<Row>>(&sql);
        for param in &query.params {
            statement = match param {
                Param::Float(v) => statement.bind(*v),
                Param::Int(v) => statement.bind(*v),
                Param::Int4(v) => statement.bind(*v),
                Param::Text(v) => statement.bind(v.clone()),
                Param::IntArray(v) => statement.bind(v.clone()),
                Param::TextArray(v) => statement.bind(v.clone()),
            };
        }

        let rows = statement.fetch_all(&mut *self.conn).await?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }
}

/// Wrap a query so each result row arrives as one JSON object, keeping the
/// column types the database reports.
fn json_rows_sql(query: &SpatialQuery) -> String {
    let inner = query.sql.trim().trim_end_matches(';');
    let mut sql = format!("SELECT row_to_json(r) AS feature_row FROM ({}) AS r", inner);
    if let Some(column) = query.order_by {
        sql.push_str(" ORDER BY r.");
        sql.push_str(column);
    }
    sql
}
