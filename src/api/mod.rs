//! HTTP surface: one POST route per query operation plus a liveness check.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;

mod handlers;

pub use handlers::*;

/// Application state shared across handlers
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Arc<Self> {
        Arc::new(Self { dispatcher })
    }
}

/// Any origin, no credentials, so a locally opened map page can call the API.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/q/pip", post(pip_handler))
        .route("/q/intersects", post(intersects_handler))
        .route("/q/within-distance", post(within_distance_handler))
        .route("/q/buffer", post(buffer_handler))
        .route("/q/area", post(area_handler))
        .route("/q/perimeter", post(perimeter_handler))
        .route("/q/knn", post(knn_handler))
        .route("/q/union", post(union_handler))
        .route("/q/intersection", post(intersection_handler))
        .route("/q/transform", post(transform_handler))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeConnections;
    use crate::dispatch::test_dispatcher;
    use serde_json::{json, Value};

    /// Serve the router on an ephemeral port and return its base URL.
    async fn spawn(fake: &FakeConnections) -> String {
        let app = router(AppState::new(test_dispatcher(fake)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn(&FakeConnections::new()).await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_area_scenario() {
        let fake = FakeConnections::new();
        fake.respond(vec![json!({"area_m2": 62_134_567.25})]);
        let base = spawn(&fake).await;

        let response = reqwest::Client::new()
            .post(format!("{}/q/area", base))
            .json(&json!({"geojson": {"type": "Polygon", "coordinates": [[[30.3, 59.9], [30.4, 59.9], [30.4, 60.0], [30.3, 60.0], [30.3, 59.9]]]}}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        let area_m2 = body["area_m2"].as_f64().unwrap();
        assert!(area_m2 > 0.0);
        assert_eq!(body["area_km2"].as_f64().unwrap(), area_m2 / 1e6);
    }

    #[tokio::test]
    async fn test_pip_far_point() {
        let base = spawn(&FakeConnections::new()).await;

        let body: Value = reqwest::Client::new()
            .post(format!("{}/q/pip", base))
            .json(&json!({"lon": 200.0, "lat": 200.0}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"type": "FeatureCollection", "features": []}));
    }

    #[tokio::test]
    async fn test_union_without_inputs_is_bad_request() {
        let base = spawn(&FakeConnections::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{}/q/union", base))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("region_ids"));
        assert_eq!(body["status"], json!(400));
    }

    #[tokio::test]
    async fn test_union_unknown_ids_is_not_found() {
        let fake = FakeConnections::new();
        fake.respond(vec![json!({"geom_geojson": null})]);
        let base = spawn(&fake).await;

        let response = reqwest::Client::new()
            .post(format!("{}/q/union", base))
            .json(&json!({"region_ids": [42]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_wrong_type_is_malformed_body() {
        let fake = FakeConnections::new();
        let base = spawn(&fake).await;

        let response = reqwest::Client::new()
            .post(format!("{}/q/knn", base))
            .json(&json!({"lon": "thirty", "lat": 59.9}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let body: Value = response.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed request body"));
        assert_eq!(fake.acquired(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_text_is_hidden() {
        let fake = FakeConnections::new();
        fake.fail(crate::error::UpstreamError::Rejected(
            "ERROR: transform: couldn't project point (SQL: SELECT secret)".to_string(),
        ));
        let base = spawn(&fake).await;

        let response = reqwest::Client::new()
            .post(format!("{}/q/transform", base))
            .json(&json!({"geojson": {"type": "Point", "coordinates": [30.3, 59.9]}, "to_epsg": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let text = response.text().await.unwrap();
        assert!(!text.contains("SELECT"));
        assert!(text.contains("spatial engine rejected the query"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let base = spawn(&FakeConnections::new()).await;

        let response = reqwest::Client::new()
            .get(format!("{}/health", base))
            .header("Origin", "null")
            .send()
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
        assert!(response
            .headers()
            .get("access-control-allow-credentials")
            .is_none());
    }
}
