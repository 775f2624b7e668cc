//! HTTP API handlers for lcx-rs

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod responses;
pub mod sse;
pub mod summary;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use responses::{list_responses, submit_response};
pub use sse::event_stream;
pub use summary::get_summary;
