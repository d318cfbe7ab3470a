//! REST API handlers for natural language queries

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use validator::Validate;

use crate::{
    middleware::{
        error_handling::{AppError, ChartError, Result},
        RequestId,
    },
    models::{
        chart::{ChartConfig, ChartKind, TableModel},
        query::{ChartQueryRequest, ChartQueryResponse, QueryRequest, QueryResponse},
    },
    services::result_shaper::shape,
    AppState,
};

fn ensure_question(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(AppError::BadRequest("Query must not be blank".to_string()));
    }
    Ok(())
}

/// POST /api/query
/// Translate a question to SQL, run it, and return the rows
pub async fn execute_query(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>> {
    let Json(request) = payload?;
    request.validate()?;
    ensure_question(&request.query)?;

    if let Some(Extension(request_id)) = request_id {
        tracing::info!(request_id = %request_id, "Query requested");
    }

    let result_set = state.query_service.run(&request.query).await?;

    Ok(Json(result_set.into()))
}

/// POST /api/query/chart
/// Same pipeline as /api/query, plus the chart configuration and table model
pub async fn chart_query(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: std::result::Result<Json<ChartQueryRequest>, JsonRejection>,
) -> Result<Json<ChartQueryResponse>> {
    let Json(request) = payload?;
    request.validate()?;
    ensure_question(&request.query)?;

    // Reject a bad selector before spending a completion call on it
    let kind = ChartKind::parse_or_default(request.chart_type.as_deref())?;

    if let Some(Extension(request_id)) = request_id {
        tracing::info!(request_id = %request_id, chart = ?kind, "Chart query requested");
    }

    let result_set = state.query_service.run(&request.query).await?;
    if result_set.is_empty() {
        return Err(ChartError::EmptyResult.into());
    }

    // Rows that cannot be charted are still returned as a table
    let (chart, chart_error, table) = match shape(&result_set.records, &state.palette) {
        Ok(shaped) => (
            Some(ChartConfig::render(&shaped.dataset, kind)),
            None,
            TableModel::new(shaped.columns, result_set.records.clone()),
        ),
        Err(
            err @ (ChartError::NonNumericValue { .. }
            | ChartError::MissingValueField { .. }
            | ChartError::UnknownField(_)),
        ) => {
            tracing::warn!("Result could not be charted: {}", err);
            (
                None,
                Some(err.to_string()),
                TableModel::from_records(result_set.records.clone()),
            )
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Json(ChartQueryResponse {
        sql_query: result_set.sql_query,
        results: result_set.records,
        chart,
        chart_error,
        table,
    }))
}
