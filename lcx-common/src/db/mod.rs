//! SQLite response store

pub mod init;
pub mod responses;

pub use init::*;
pub use responses::{count_responses, import_response, insert_response, list_responses};
