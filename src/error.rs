//! Error taxonomy for query operations and its HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::geojson::GeometryError;

/// Failure reported by the database access layer.
///
/// The carried message is driver/engine text. It is logged, never sent to
/// clients.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The spatial engine refused the statement (bad coordinates, unknown SRID, ...)
    #[error("spatial engine rejected the query: {0}")]
    Rejected(String),
    /// No connection could be obtained
    #[error("database unavailable: {0}")]
    Unavailable(String),
    /// Any other driver failure, including rows of an unexpected shape
    #[error("database driver error: {0}")]
    Driver(String),
}

impl From<sqlx::Error> for UpstreamError {
    fn from(err: sqlx::Error) -> Self {
        let message = err.to_string();
        match err {
            sqlx::Error::Database(_) => UpstreamError::Rejected(message),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => UpstreamError::Unavailable(message),
            _ => UpstreamError::Driver(message),
        }
    }
}

/// Every way a query operation can fail.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingParameter(Vec<&'static str>),

    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl QueryError {
    /// Build a `MissingParameter` error from `(field, is_missing)` pairs.
    pub fn missing<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, bool)>,
    {
        QueryError::MissingParameter(
            fields
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| name)
                .collect(),
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::MissingParameter(_)
            | QueryError::InvalidParameter { .. }
            | QueryError::MalformedBody(_)
            | QueryError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
            QueryError::NotFound(_) => StatusCode::NOT_FOUND,
            QueryError::Upstream(UpstreamError::Rejected(_)) => StatusCode::BAD_REQUEST,
            QueryError::Upstream(UpstreamError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            QueryError::Upstream(UpstreamError::Driver(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Upstream text stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            QueryError::Upstream(UpstreamError::Rejected(_)) => {
                "spatial engine rejected the query".to_string()
            }
            QueryError::Upstream(UpstreamError::Unavailable(_)) => {
                "database temporarily unavailable".to_string()
            }
            QueryError::Upstream(UpstreamError::Driver(_)) => "spatial query failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for QueryError {
    fn from(rejection: JsonRejection) -> Self {
        QueryError::MalformedBody(rejection.body_text())
    }
}

/// Convert QueryError to HTTP response
impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let QueryError::Upstream(ref upstream) = self {
            error!("Spatial query failed: {}", upstream);
        }

        let body = serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_only_absent_fields() {
        let err = QueryError::missing([("lon", false), ("lat", true), ("radius_m", true)]);
        assert_eq!(err.to_string(), "missing required parameter(s): lat, radius_m");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_text_is_not_public() {
        let err = QueryError::from(UpstreamError::Rejected(
            "parse error - invalid geometry at ST_GeomFromGeoJSON".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.public_message().contains("ST_GeomFromGeoJSON"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            QueryError::NotFound("nothing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QueryError::from(UpstreamError::Unavailable("pool timed out".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            QueryError::from(UpstreamError::Driver("bad row".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = UpstreamError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, UpstreamError::Unavailable(_)));
    }
}
