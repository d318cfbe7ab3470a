pub mod error_handling;
pub mod metrics;
pub mod request_id;

pub use error_handling::*;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
