//! Interactive review session endpoints
//!
//! Sessions are server-held: the registry maps a handle to a
//! `ReviewSessionManager` plus its persistence-failure channel. Responses
//! drain that channel so clients learn about schedule writes that failed
//! after their feedback was accepted.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use recall_core::model::{Quality, Question, ReviewMode, ReviewScope, ScopeKind};
use recall_core::session::{FeedbackFailure, SessionPhase};
use recall_core::ReviewSessionManager;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppState, SessionEntry};

#[derive(Debug, Deserialize)]
pub struct ScopeBody {
    kind: Option<ScopeKind>,
    id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionBody {
    mode: Option<ReviewMode>,
    scope: Option<ScopeBody>,
}

fn current_json(question: Option<&Question>) -> Value {
    match question {
        // The answer is withheld until reveal
        Some(q) => json!({ "id": q.id, "question": q.question }),
        None => Value::Null,
    }
}

fn failures_json(failures: Vec<FeedbackFailure>) -> Value {
    failures
        .into_iter()
        .map(|f| json!({ "questionId": f.question_id, "error": f.error }))
        .collect::<Vec<_>>()
        .into()
}

fn drain_failures(rx: &mut tokio::sync::mpsc::UnboundedReceiver<FeedbackFailure>) -> Vec<FeedbackFailure> {
    let mut failures = Vec::new();
    while let Ok(f) = rx.try_recv() {
        failures.push(f);
    }
    failures
}

/// POST /api/sessions
pub async fn start_session(
    State(state): State<AppState>,
    Json(body): Json<StartSessionBody>,
) -> Result<Json<Value>, ApiError> {
    let mut missing = Vec::new();
    if body.mode.is_none() {
        missing.push("mode");
    }
    let scope = match body.scope {
        Some(scope) => {
            if scope.kind.is_none() {
                missing.push("scope.kind");
            }
            if scope.id.is_none() {
                missing.push("scope.id");
            }
            match (scope.kind, scope.id) {
                (Some(kind), Some(id)) => Some(ReviewScope::from_parts(kind, id)),
                _ => None,
            }
        }
        None => {
            missing.push("scope");
            None
        }
    };
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }
    let (mode, scope) = (body.mode.unwrap(), scope.unwrap());

    let (mut manager, failures) =
        ReviewSessionManager::new(state.storage.clone(), state.storage.clone());
    let phase = manager.start(mode, scope, Utc::now())?;
    let (total, remaining) = manager
        .session()
        .map(|s| (s.questions().len(), s.remaining().len()))
        .unwrap_or((0, 0));

    let handle = Uuid::new_v4();
    let response = json!({
        "success": true,
        "sessionId": handle,
        "phase": phase,
        "total": total,
        "remaining": remaining,
        "current": current_json(manager.current_question()),
    });

    state
        .sessions
        .lock()
        .await
        .insert(handle, SessionEntry { manager, failures });
    Ok(Json(response))
}

/// POST /api/sessions/{id}/reveal
pub async fn reveal_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let entry = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))?;

    let question = entry.manager.show_answer()?;
    Ok(Json(json!({
        "success": true,
        "phase": SessionPhase::AwaitingFeedback,
        "answer": question.answer,
    })))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    quality: Option<i32>,
}

/// POST /api/sessions/{id}/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<Value>, ApiError> {
    let raw = body.quality.ok_or(ApiError::MissingFields(vec!["quality"]))?;
    let quality = Quality::from_i32(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("quality must be 1-4, got {}", raw)))?;

    let mut sessions = state.sessions.lock().await;
    let entry = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))?;

    let phase = entry.manager.submit_feedback(quality, Utc::now())?;
    let remaining = entry
        .manager
        .session()
        .map(|s| s.remaining().len())
        .unwrap_or(0);
    Ok(Json(json!({
        "success": true,
        "phase": phase,
        "remaining": remaining,
        "current": current_json(entry.manager.current_question()),
        "persistenceFailures": failures_json(drain_failures(&mut entry.failures)),
    })))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let mut sessions = state.sessions.lock().await;
    let entry = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))?;

    let session = entry
        .manager
        .session()
        .ok_or(ApiError::NotFound(format!("session {}", id)))?;
    Ok(Json(json!({
        "success": true,
        "phase": session.phase(),
        "mode": session.mode,
        "total": session.questions().len(),
        "remaining": session.remaining().len(),
        "current": current_json(entry.manager.current_question()),
        "sessionElapsedSeconds": entry.manager.session_elapsed(now).map(|d| d.num_seconds()),
        "questionElapsedSeconds": entry
            .manager
            .current_question_elapsed(now)
            .map(|d| d.num_seconds()),
        "persistenceFailures": failures_json(drain_failures(&mut entry.failures)),
    })))
}

/// DELETE /api/sessions/{id}
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let mut entry = sessions
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", id)))?;

    // In-flight schedule writes keep running; only the in-memory state goes
    entry.manager.end_session();
    Ok(Json(json!({ "success": true })))
}
