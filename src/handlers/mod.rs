pub mod health;
pub mod query;

pub use health::health_check;
pub use query::{chart_query, execute_query};
