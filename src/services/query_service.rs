/// Natural Language Query Service
///
/// Sends the user's question to the completion service, extracts the
/// generated SQL from the reply and executes it against the data store.

use std::sync::Arc;
use std::time::Instant;

use crate::{
    middleware::{
        error_handling::{AppError, Result},
        metrics::{record_query_outcome, record_result_rows, record_stage_duration},
    },
    models::query::ResultSet,
    repositories::QueryExecutor,
    services::{
        completion_service::{CompletionClient, CompletionRequest},
        prompt::PromptBuilder,
        sql_extraction::extract_sql,
    },
    utils::sanitize_for_log,
};

/// Completion call parameters for SQL generation
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: Some(0.2),
        }
    }
}

pub struct QueryService {
    completion: Arc<dyn CompletionClient>,
    executor: Arc<dyn QueryExecutor>,
    prompt: PromptBuilder,
    settings: GenerationSettings,
}

impl QueryService {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        executor: Arc<dyn QueryExecutor>,
        prompt: PromptBuilder,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            completion,
            executor,
            prompt,
            settings,
        }
    }

    /// Generate SQL for `question`. The returned text is what the data store
    /// will run.
    pub async fn generate_sql(&self, question: &str) -> Result<String> {
        let request = CompletionRequest {
            system_prompt: Some(self.prompt.system_prompt().to_string()),
            messages: vec![self.prompt.user_message(question)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let started = Instant::now();
        let response = match self.completion.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                record_query_outcome("completion_error");
                return Err(e);
            }
        };
        record_stage_duration("completion", started.elapsed());

        match extract_sql(&response.content) {
            Some(sql) => Ok(sql),
            None => {
                tracing::error!(
                    "No SQL found in completion response: {}",
                    sanitize_for_log(&response.content)
                );
                record_query_outcome("extraction_error");
                Err(AppError::SqlExtraction)
            }
        }
    }

    /// Execute a natural language query end to end
    pub async fn run(&self, question: &str) -> Result<ResultSet> {
        let start_time = Instant::now();
        let question = question.trim();

        tracing::info!("NL query requested: {}", sanitize_for_log(question));

        let sql_query = self.generate_sql(question).await?;
        tracing::debug!("Generated SQL: {}", sanitize_for_log(&sql_query));

        let execute_start = Instant::now();
        let records = match self.executor.execute(&sql_query).await {
            Ok(records) => records,
            Err(e) => {
                record_query_outcome("database_error");
                tracing::warn!(
                    "Generated SQL failed to execute: {}",
                    sanitize_for_log(&sql_query)
                );
                return Err(e);
            }
        };
        record_stage_duration("execution", execute_start.elapsed());
        record_result_rows(records.len());
        record_query_outcome(if records.is_empty() { "empty" } else { "success" });

        tracing::info!(
            "NL query executed: query={}, results={}, time={}ms",
            sanitize_for_log(question),
            records.len(),
            start_time.elapsed().as_millis()
        );

        Ok(ResultSet {
            query: question.to_string(),
            sql_query,
            records,
        })
    }
}
