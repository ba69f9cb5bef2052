//! Question endpoints
//!
//! The create body is deserialized with every field optional so a single 400
//! can list all missing required names at once, matching the client contract.

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use recall_core::model::{Question, ReviewEntry, DEFAULT_EASE_FACTOR};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionBody {
    id: Option<Uuid>,
    note_id: Option<Uuid>,
    user_id: Option<Uuid>,
    question: Option<String>,
    answer: Option<String>,
    time_stamp: Option<DateTime<Utc>>,
    history: Option<Vec<ReviewEntry>>,

    // Schedule state is optional on create; a fresh card is due immediately
    repetition: Option<u32>,
    interval: Option<u32>,
    ease_factor: Option<f64>,
    next_review: Option<DateTime<Utc>>,
    last_review: Option<DateTime<Utc>>,
}

/// POST /api/questions
pub async fn create_question(
    State(state): State<AppState>,
    Json(body): Json<CreateQuestionBody>,
) -> Result<Json<Value>, ApiError> {
    let mut missing = Vec::new();
    if body.id.is_none() {
        missing.push("id");
    }
    if body.note_id.is_none() {
        missing.push("noteId");
    }
    if body.user_id.is_none() {
        missing.push("userId");
    }
    if body.question.is_none() {
        missing.push("question");
    }
    if body.answer.is_none() {
        missing.push("answer");
    }
    if body.time_stamp.is_none() {
        missing.push("timeStamp");
    }
    if body.history.is_none() {
        missing.push("history");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    // Checked above
    let created_at = body.time_stamp.unwrap();
    let question = Question {
        id: body.id.unwrap(),
        note_id: body.note_id.unwrap(),
        user_id: body.user_id.unwrap(),
        question: body.question.unwrap(),
        answer: body.answer.unwrap(),
        created_at,
        repetition: body.repetition.unwrap_or(0),
        interval: body.interval.unwrap_or(0),
        ease_factor: body.ease_factor.unwrap_or(DEFAULT_EASE_FACTOR),
        next_review: body.next_review.unwrap_or(created_at),
        last_review: body.last_review,
        history: body.history.unwrap(),
    };

    state.storage.insert_question(&question)?;
    Ok(Json(json!({ "success": true, "question": question })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuestionsParams {
    note_id: Option<Uuid>,
}

/// GET /api/questions?noteId=…
pub async fn list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListQuestionsParams>,
) -> Result<Json<Value>, ApiError> {
    let note_id = params
        .note_id
        .ok_or(ApiError::MissingFields(vec!["noteId"]))?;
    let questions = state.storage.questions_for_note(note_id)?;
    Ok(Json(json!({ "success": true, "questions": questions })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuestionParams {
    id: Option<Uuid>,
}

/// DELETE /api/questions?id=…
pub async fn delete_question(
    State(state): State<AppState>,
    Query(params): Query<DeleteQuestionParams>,
) -> Result<Json<Value>, ApiError> {
    let id = params.id.ok_or(ApiError::MissingFields(vec!["id"]))?;
    state.storage.delete_question(id)?;
    Ok(Json(json!({ "success": true })))
}
