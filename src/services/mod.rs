pub mod color;
pub mod completion_service;
pub mod presentation;
pub mod prompt;
pub mod query_client;
pub mod query_service;
pub mod query_session;
pub mod result_shaper;
pub mod sql_extraction;

pub use color::ChartPalette;
pub use completion_service::{ClaudeCompletionService, CompletionClient};
pub use query_client::{ClientError, QueryClient};
pub use query_service::{GenerationSettings, QueryService};
pub use query_session::{QuerySession, ResponsePolicy};
