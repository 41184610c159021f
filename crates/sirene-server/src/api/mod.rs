//! HTTP surface shared by every feature
pub mod response;

pub use response::{ApiResponse, ErrorDetail, ErrorResponse, ResponseMeta};
