pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{ChartPalette, QueryService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
    pub palette: ChartPalette,
}

pub fn create_app(state: AppState) -> Router {
    use crate::handlers::{chart_query, execute_query, health_check};
    use crate::middleware::{metrics, request_id_middleware};

    Router::new()
        .route("/api/query", post(execute_query))
        .route("/api/query/chart", post(chart_query))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(metrics::metrics_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
}

/// CORS policy restricted to the configured browser origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(header_val) => Some(header_val),
            Err(e) => {
                tracing::error!("❌ Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    tracing::info!("✅ CORS configured with {} allowed origins", allowed.len());

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        prompt::PromptBuilder,
        query_service::testing::{ScriptedCompletion, ScriptedExecutor},
        GenerationSettings,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(completion: ScriptedCompletion, executor: ScriptedExecutor) -> Router {
        let service = QueryService::new(
            Arc::new(completion),
            Arc::new(executor),
            PromptBuilder::new(),
            GenerationSettings::default(),
        );
        create_app(AppState {
            query_service: Arc::new(service),
            palette: ChartPalette::default(),
        })
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_query_returns_results_and_sql() {
        let app = app(
            ScriptedCompletion::replying("```sql\nSELECT month, sales FROM monthly_sales\n```"),
            ScriptedExecutor::returning(json!([
                {"month": "Jan", "sales": "$1,000.00"},
                {"month": "Feb", "sales": "$2,000.00"}
            ])),
        );

        let (status, body) =
            post_json(app, "/api/query", r#"{"query": "monthly sales"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sqlQuery"], "SELECT month, sales FROM monthly_sales");
        assert_eq!(body["results"][1]["month"], "Feb");

        // Field order survives serialization
        let first = body["results"][0].as_object().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["month", "sales"]);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let app = app(
            ScriptedCompletion::replying("SELECT 1"),
            ScriptedExecutor::returning(json!([])),
        );
        let (status, body) = post_json(app, "/api/query", r#"{"query": "   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query must not be blank");
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let app = app(
            ScriptedCompletion::replying("SELECT 1"),
            ScriptedExecutor::returning(json!([])),
        );
        let (status, body) = post_json(app, "/api/query", r#"{"question": 1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_completion_failure_is_opaque() {
        let app = app(
            ScriptedCompletion::failing("401 invalid x-api-key"),
            ScriptedExecutor::returning(json!([])),
        );
        let (status, body) = post_json(app, "/api/query", r#"{"query": "anything"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Error processing query");
    }

    #[tokio::test]
    async fn test_database_failure_is_opaque() {
        let app = app(
            ScriptedCompletion::replying("SELECT nope FROM nowhere"),
            ScriptedExecutor::failing(),
        );
        let (status, body) = post_json(app, "/api/query", r#"{"query": "anything"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database query error");
    }

    #[tokio::test]
    async fn test_chart_query_renders_requested_kind() {
        let app = app(
            ScriptedCompletion::replying("SELECT customer, total_amount FROM x"),
            ScriptedExecutor::returning(json!([
                {"customer": "Acme", "total_amount": 1500.0},
                {"customer": "Globex", "total_amount": 3000.0}
            ])),
        );

        let (status, body) = post_json(
            app,
            "/api/query/chart",
            r#"{"query": "top customers", "chartType": "bar"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chart"]["type"], "bar");
        assert!(body["chartError"].is_null());
        assert_eq!(body["chart"]["data"]["labels"], json!(["Acme", "Globex"]));
        assert_eq!(
            body["chart"]["options"]["tooltip"]["labels"][0],
            "total_amount: $1,500.00"
        );
        assert_eq!(body["table"]["columns"][1]["accessor"], "total_amount");
        assert_eq!(body["table"]["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_chart_query_empty_result() {
        let app = app(
            ScriptedCompletion::replying("SELECT a, b FROM empty_table"),
            ScriptedExecutor::returning(json!([])),
        );
        let (status, body) =
            post_json(app, "/api/query/chart", r#"{"query": "nothing here"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No results found");
    }

    #[tokio::test]
    async fn test_chart_query_non_numeric_values_still_return_table() {
        let app = app(
            ScriptedCompletion::replying("SELECT name, status FROM customers"),
            ScriptedExecutor::returning(json!([{"name": "Acme", "status": "active"}])),
        );
        let (status, body) =
            post_json(app, "/api/query/chart", r#"{"query": "customer status"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["chart"].is_null());
        assert_eq!(
            body["chartError"],
            "Row 0: value 'active' in field 'status' is not numeric"
        );
        assert_eq!(body["results"][0]["status"], "active");
        assert_eq!(body["table"]["columns"][1]["accessor"], "status");
        assert_eq!(body["table"]["rows"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chart_query_single_column_still_returns_table() {
        let app = app(
            ScriptedCompletion::replying("SELECT COUNT(*) AS count FROM service_requests"),
            ScriptedExecutor::returning(json!([{"count": 42}])),
        );
        let (status, body) =
            post_json(app, "/api/query/chart", r#"{"query": "how many requests"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["chart"].is_null());
        assert_eq!(
            body["chartError"],
            "Result needs at least two columns to chart, found 1"
        );
        assert_eq!(body["table"]["columns"], json!([{"header": "count", "accessor": "count"}]));
        assert_eq!(body["table"]["rows"][0]["count"], 42);
    }

    #[tokio::test]
    async fn test_chart_query_unknown_kind() {
        let app = app(
            ScriptedCompletion::replying("SELECT 1"),
            ScriptedExecutor::returning(json!([])),
        );
        let (status, body) = post_json(
            app,
            "/api/query/chart",
            r#"{"query": "q", "chartType": "scatter"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown chart type: scatter");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app(
            ScriptedCompletion::replying("SELECT 1"),
            ScriptedExecutor::returning(json!([])),
        );
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(crate::middleware::REQUEST_ID_HEADER));
    }
}
