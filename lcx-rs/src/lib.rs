//! lcx-rs library - Response Store service
//!
//! Persists survey submissions and serves the full collection, a server-side
//! summary and a live event stream.

use axum::Router;
use lcx_common::events::EventBus;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod import;

/// Events buffered per SSE subscriber before the oldest are dropped
pub const EVENT_BUS_CAPACITY: usize = 100;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Response database pool
    pub db: SqlitePool,
    /// Broadcast of store events to SSE clients
    pub events: EventBus,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }
}

/// Build application router
///
/// Every route is public; the survey has no authentication.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let store = Router::new().route(
        "/responses",
        get(api::list_responses).post(api::submit_response),
    );

    let dashboard = Router::new()
        .route("/api/summary", get(api::get_summary))
        .route("/api/events", get(api::event_stream))
        .route("/api/buildinfo", get(api::get_build_info));

    Router::new()
        .merge(store)
        .merge(dashboard)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Submission form and dashboard are served from other origins
        .layer(CorsLayer::permissive())
}
