//! AI review endpoints
//!
//! Thin shims over the pipeline: request kicks off generation, start and
//! answers drive the per-session state machine, status is a poll target.
//! Answers stay hidden until the session completes.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use recall_core::model::{AiReviewSession, ReviewItem, ScopeKind, SessionStatus};
use recall_core::ReviewScope;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestReviewBody {
    source_id: Option<Uuid>,
    source_type: Option<ScopeKind>,
    user_id: Option<Uuid>,
    difficulty: Option<String>,
}

fn session_json(session: &AiReviewSession, items: &[ReviewItem]) -> Value {
    let questions: Vec<Value> = match session.status {
        // Before completion clients only see the prompts
        SessionStatus::ReadyForReview
        | SessionStatus::InProgress
        | SessionStatus::EvaluatingAnswers => items
            .iter()
            .map(|i| json!({ "position": i.position, "question": i.question }))
            .collect(),
        SessionStatus::Completed => items
            .iter()
            .map(|i| {
                json!({ "position": i.position, "question": i.question, "answer": i.answer })
            })
            .collect(),
        SessionStatus::Pending | SessionStatus::Failed => Vec::new(),
    };

    json!({ "success": true, "session": session, "questions": questions })
}

/// POST /api/reviews
pub async fn request_review(
    State(state): State<AppState>,
    Json(body): Json<RequestReviewBody>,
) -> Result<Json<Value>, ApiError> {
    let mut missing = Vec::new();
    if body.source_id.is_none() {
        missing.push("sourceId");
    }
    if body.source_type.is_none() {
        missing.push("sourceType");
    }
    if body.user_id.is_none() {
        missing.push("userId");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let scope = ReviewScope::from_parts(body.source_type.unwrap(), body.source_id.unwrap());
    let session = state
        .pipeline
        .request(scope, body.user_id.unwrap(), body.difficulty)?;
    Ok(Json(json!({ "success": true, "session": session })))
}

/// GET /api/reviews/{id}
pub async fn review_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let session = state.pipeline.status(id)?;
    let items = state.pipeline.items(id)?;
    Ok(Json(session_json(&session, &items)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfinishedParams {
    user_id: Option<Uuid>,
}

/// GET /api/reviews/unfinished?userId=…
pub async fn unfinished_reviews(
    State(state): State<AppState>,
    Query(params): Query<UnfinishedParams>,
) -> Result<Json<Value>, ApiError> {
    let user_id = params
        .user_id
        .ok_or(ApiError::MissingFields(vec!["userId"]))?;
    let sessions = state.pipeline.unfinished(user_id)?;
    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

/// POST /api/reviews/{id}/start
pub async fn start_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let session = state.pipeline.begin(id)?;
    let items = state.pipeline.items(id)?;
    Ok(Json(session_json(&session, &items)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswersBody {
    answers: Option<Vec<String>>,
}

/// POST /api/reviews/{id}/answers
pub async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitAnswersBody>,
) -> Result<Json<Value>, ApiError> {
    let answers = body
        .answers
        .ok_or(ApiError::MissingFields(vec!["answers"]))?;
    let session = state.pipeline.submit_answers(id, answers)?;
    Ok(Json(json!({ "success": true, "session": session })))
}
