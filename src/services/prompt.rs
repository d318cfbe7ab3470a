/// Prompt construction for SQL generation: fixed schema description plus
/// few-shot example questions

use crate::services::completion_service::{user_message, ChatMessage};

// Database schema for completion context
pub const DATABASE_SCHEMA: &str = r#"
# Service Desk Database Schema (PostgreSQL)

## Tables

### customers
Columns: id (SERIAL), name (TEXT), email (TEXT), phone (TEXT), segment (TEXT: 'residential', 'commercial', 'government'),
         created_at (TIMESTAMPTZ)

### locations
Columns: id (SERIAL), customer_id (INTEGER), address (TEXT), city (TEXT), state (TEXT), postal_code (TEXT),
         region (TEXT: 'north', 'south', 'east', 'west')

### service_requests
Columns: id (SERIAL), customer_id (INTEGER), location_id (INTEGER), category (TEXT), priority (TEXT: 'low', 'medium', 'high', 'urgent'),
         status (TEXT: 'open', 'in_progress', 'resolved', 'closed', 'cancelled'),
         subtotal (NUMERIC(10,2)), tax_amount (NUMERIC(10,2)), opened_at (TIMESTAMPTZ), closed_at (TIMESTAMPTZ)

## Relationships
- locations.customer_id → customers.id
- service_requests.customer_id → customers.id
- service_requests.location_id → locations.id
"#;

/// Example question/SQL pairs. Each pair returns the category column first
/// and the numeric column second, which is the shape the chart expects.
pub const EXAMPLE_QUERIES: &[(&str, &str)] = &[
    (
        "How many service requests were opened each month this year?",
        "SELECT TO_CHAR(DATE_TRUNC('month', opened_at), 'Mon YYYY') AS month, COUNT(*) AS request_count \
         FROM service_requests \
         WHERE opened_at >= DATE_TRUNC('year', CURRENT_DATE) \
         GROUP BY DATE_TRUNC('month', opened_at) \
         ORDER BY DATE_TRUNC('month', opened_at)",
    ),
    (
        "Which customers have the highest billed subtotal?",
        "SELECT c.name AS customer, SUM(sr.subtotal) AS total_subtotal \
         FROM service_requests sr JOIN customers c ON sr.customer_id = c.id \
         GROUP BY c.name \
         ORDER BY total_subtotal DESC \
         LIMIT 10",
    ),
    (
        "Show open requests by city",
        "SELECT l.city, COUNT(*) AS open_requests \
         FROM service_requests sr JOIN locations l ON sr.location_id = l.id \
         WHERE sr.status = 'open' \
         GROUP BY l.city \
         ORDER BY open_requests DESC",
    ),
    (
        "What is the average tax amount per request in each region?",
        "SELECT l.region, ROUND(AVG(sr.tax_amount), 2) AS average_tax_amount \
         FROM service_requests sr JOIN locations l ON sr.location_id = l.id \
         GROUP BY l.region \
         ORDER BY l.region",
    ),
];

const INSTRUCTIONS: &str = "You are an expert PostgreSQL analyst for a field service company. \
Translate the user's question into a single read-only SELECT statement against the schema below. \
Put the category or label column first and the numeric measure second so the result can be charted. \
Respond with the SQL only, inside a ```sql fenced code block, with no explanation.";

/// Builds the system message and wraps user questions.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::with_schema(DATABASE_SCHEMA, EXAMPLE_QUERIES)
    }

    pub fn with_schema(schema: &str, examples: &[(&str, &str)]) -> Self {
        let mut system_prompt = format!("{}\n\nDATABASE SCHEMA:\n{}\n\nEXAMPLES:\n", INSTRUCTIONS, schema.trim());

        for (question, sql) in examples {
            system_prompt.push_str(&format!("\nQ: \"{}\"\nA:\n```sql\n{}\n```\n", question, sql));
        }

        Self { system_prompt }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_message(&self, question: &str) -> ChatMessage {
        user_message(format!(
            "Generate a SQL query for this question:\n\nQUESTION: {}",
            question.trim()
        ))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
