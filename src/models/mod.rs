pub mod chart;
pub mod query;

pub use chart::*;
pub use query::*;
