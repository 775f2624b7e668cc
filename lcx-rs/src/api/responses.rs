//! Response collection endpoints
//!
//! `POST /responses` stores one validated submission.
//! `GET /responses` returns every stored record in insertion order.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use lcx_common::events::LcxEvent;
use lcx_common::{db, validate, CandidateResponse, SurveyResponse};
use tracing::{debug, info};

use super::ApiError;
use crate::AppState;

/// POST /responses
///
/// Validates the body, stores it and answers 201 with the stored record
/// (including its new id). Nothing is stored when any field is invalid.
pub async fn submit_response(
    State(state): State<AppState>,
    payload: Result<Json<CandidateResponse>, JsonRejection>,
) -> Result<(StatusCode, Json<SurveyResponse>), ApiError> {
    let Json(candidate) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let submission = validate(&candidate).map_err(|errors| {
        debug!("Rejected submission: {}", errors);
        ApiError::Validation(errors)
    })?;

    let stored = db::insert_response(&state.db, submission).await?;
    info!("Stored response {} from {}", stored.id, stored.name);

    state.events.emit_lossy(LcxEvent::ResponseSubmitted {
        id: stored.id,
        name: stored.name.clone(),
        sector: stored.sector.code().to_string(),
        timestamp: chrono::Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /responses
pub async fn list_responses(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveyResponse>>, ApiError> {
    let responses = db::list_responses(&state.db).await?;
    debug!("Serving {} responses", responses.len());
    Ok(Json(responses))
}
