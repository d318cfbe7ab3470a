pub mod query_repo;

pub use query_repo::{PgQueryExecutor, QueryExecutor};
