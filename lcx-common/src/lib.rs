//! # LCX Common Library
//!
//! Shared code for the LCX survey services including:
//! - Survey response model and wire format
//! - Submission validation
//! - Aggregation of response collections into dashboard views
//! - SQLite response store
//! - Event types and SSE helpers
//! - Configuration loading

pub mod aggregate;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;
pub mod validation;

pub use aggregate::{summarize, AggregationOptions, DashboardSummary, SkillAttribution, Tally};
pub use error::{Error, Result};
pub use models::{CandidateResponse, NetworkingInterest, NewSurveyResponse, Sector, SurveyResponse};
pub use validation::{validate, ValidationErrors};
