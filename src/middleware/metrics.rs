// ============================================================================
// Prometheus Metrics
// ============================================================================
//
// ## Metrics Collected:
//
// - insights_http_request_duration_seconds (histogram; method, path, status)
// - insights_http_requests_total (counter; method, path, status)
// - insights_http_connections_active (gauge)
// - insights_queries_total (counter; outcome)
// - insights_query_stage_duration_seconds (histogram; stage)
// - insights_query_result_rows (histogram)
// - insights_completion_tokens_total (counter; direction)
//
// ## Endpoints:
//
// - GET /metrics - Prometheus scrape endpoint
//
// ============================================================================

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_histogram_vec,
    CounterVec, Encoder, Gauge, Histogram, HistogramVec, TextEncoder,
};
use std::time::{Duration, Instant};

lazy_static! {
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "insights_http_request_duration_seconds",
        "HTTP request latency in seconds",
        &["method", "path", "status"],
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "insights_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    ).unwrap();

    pub static ref HTTP_CONNECTIONS_ACTIVE: Gauge = register_gauge!(
        "insights_http_connections_active",
        "Number of in-flight HTTP requests"
    ).unwrap();

    /// Natural language queries by outcome
    pub static ref QUERIES_TOTAL: CounterVec = register_counter_vec!(
        "insights_queries_total",
        "Natural language queries processed, by outcome",
        &["outcome"]
    ).unwrap();

    /// Time spent in each pipeline stage (completion, execution)
    pub static ref QUERY_STAGE_DURATION: HistogramVec = register_histogram_vec!(
        "insights_query_stage_duration_seconds",
        "Query pipeline stage latency in seconds",
        &["stage"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    ).unwrap();

    pub static ref QUERY_RESULT_ROWS: Histogram = register_histogram!(
        "insights_query_result_rows",
        "Rows returned per executed query",
        vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]
    ).unwrap();

    pub static ref COMPLETION_TOKENS_TOTAL: CounterVec = register_counter_vec!(
        "insights_completion_tokens_total",
        "Completion API tokens consumed",
        &["direction"]
    ).unwrap();
}

/// Replace numeric and UUID path segments so label cardinality stays bounded
///
/// Example: /api/query/123 -> /api/query/:id
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok() || segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", normalized.join("/"))
}

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    HTTP_CONNECTIONS_ACTIVE.inc();

    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &path, &status])
        .observe(duration.as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &path, &status])
        .inc();
    HTTP_CONNECTIONS_ACTIVE.dec();

    tracing::debug!(
        target: "metrics",
        method = %method,
        path = %path,
        status = %status,
        duration_ms = %duration.as_millis(),
        "HTTP request completed"
    );

    response
}

/// Returns Prometheus-formatted metrics for scraping
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS FOR APPLICATION USE
// ============================================================================

/// Outcome labels: success, empty, completion_error, extraction_error, database_error
pub fn record_query_outcome(outcome: &str) {
    QUERIES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_stage_duration(stage: &str, elapsed: Duration) {
    QUERY_STAGE_DURATION
        .with_label_values(&[stage])
        .observe(elapsed.as_secs_f64());
}

pub fn record_result_rows(rows: usize) {
    QUERY_RESULT_ROWS.observe(rows as f64);
}

pub fn record_completion_tokens(input: u32, output: u32) {
    COMPLETION_TOKENS_TOTAL
        .with_label_values(&["input"])
        .inc_by(f64::from(input));
    COMPLETION_TOKENS_TOTAL
        .with_label_values(&["output"])
        .inc_by(f64::from(output));
}
