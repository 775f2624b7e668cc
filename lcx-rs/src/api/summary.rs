//! Server-side dashboard summary
//!
//! Same aggregation the dashboard runs locally, for clients that would
//! rather not download every record.

use axum::{
    extract::{Query, State},
    Json,
};
use lcx_common::{db, summarize, AggregationOptions, DashboardSummary, SkillAttribution};
use serde::Deserialize;

use super::ApiError;
use crate::AppState;

/// Largest accepted `top` / `recent` value
pub const MAX_LIST_LENGTH: usize = 50;

/// Query parameters for the summary
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Length of the top-skills ranking (default 5)
    pub top: Option<usize>,
    /// Length of the recent-profiles feed (default 5)
    pub recent: Option<usize>,
    /// `every_listed_skill` (default) or `primary_skill_only`
    pub attribution: Option<SkillAttribution>,
}

impl SummaryQuery {
    fn into_options(self) -> Result<AggregationOptions, ApiError> {
        let defaults = AggregationOptions::default();
        Ok(AggregationOptions {
            top_skills: bounded("top", self.top.unwrap_or(defaults.top_skills))?,
            recent_profiles: bounded("recent", self.recent.unwrap_or(defaults.recent_profiles))?,
            skill_attribution: self.attribution.unwrap_or(defaults.skill_attribution),
        })
    }
}

fn bounded(name: &str, value: usize) -> Result<usize, ApiError> {
    if (1..=MAX_LIST_LENGTH).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "{} must be between 1 and {}",
            name, MAX_LIST_LENGTH
        )))
    }
}

/// GET /api/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let options = query.into_options()?;
    let responses = db::list_responses(&state.db).await?;
    Ok(Json(summarize(&responses, &options)))
}
