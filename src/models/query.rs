//! Natural language query models: HTTP request/response bodies and result sets

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::chart::{ChartConfig, TableModel};

/// One row of a query result, keyed by column name in query order.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Result Set
// ============================================================================

/// Rows produced by one natural language question, plus the text that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// The literal question as typed by the user
    pub query: String,
    /// The SQL the completion service generated for it
    pub sql_query: String,
    pub records: Vec<Record>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// API Request/Response Models
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, max = 2000))]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub results: Vec<Record>,
    pub sql_query: String,
}

impl From<ResultSet> for QueryResponse {
    fn from(result_set: ResultSet) -> Self {
        Self {
            results: result_set.records,
            sql_query: result_set.sql_query,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChartQueryRequest {
    #[validate(length(min = 1, max = 2000))]
    pub query: String,
    #[serde(default)]
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQueryResponse {
    pub sql_query: String,
    pub results: Vec<Record>,
    /// `None` when the rows could not be charted; the table is still returned
    pub chart: Option<ChartConfig>,
    /// Why `chart` is missing
    pub chart_error: Option<String>,
    pub table: TableModel,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub status: Option<u16>,
}
