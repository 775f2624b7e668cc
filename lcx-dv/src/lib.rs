//! lcx-dv library - Dashboard View client
//!
//! Polls the response store, keeps the latest response collection in a
//! `watch` cell and renders aggregate views of it. Also submits new
//! profiles after validating them locally.

pub mod client;
pub mod config;
pub mod refresh;
pub mod render;

pub use client::{ClientError, ResponseSource, StoreClient, SUBMIT_FAILURE_NOTICE};
pub use config::{DashboardConfig, DashboardOverrides};
pub use refresh::{RefreshHandle, RefreshLoop, Snapshot};
pub use render::render_summary;
