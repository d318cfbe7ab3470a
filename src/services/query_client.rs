/// HTTP client for the query API, used by the `ask` binary and anything
/// else that drives a `QuerySession`

use thiserror::Error;

use crate::models::query::{ErrorResponse, QueryRequest, QueryResponse, ResultSet};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("{0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// A 2xx response whose body was not a query response
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct QueryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl QueryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/query", self.base_url)
    }

    /// POST the question to `/api/query`
    pub async fn query(&self, question: &str) -> Result<ResultSet, ClientError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .json(&QueryRequest {
                query: question.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(upstream_error(status.as_u16(), &body));
        }

        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(ResultSet {
            query: question.to_string(),
            sql_query: parsed.sql_query,
            records: parsed.results,
        })
    }
}

fn upstream_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| format!("Request failed with status {}", status));
    ClientError::Upstream { status, message }
}
