//! Note registry endpoints
//!
//! Not note CRUD: the registry holds only what scope resolution reads
//! (folder membership, owner, archived flag). Note content lives elsewhere.

use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use recall_core::model::NoteRecord;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNoteBody {
    id: Option<Uuid>,
    folder_id: Option<Uuid>,
    user_id: Option<Uuid>,
    title: Option<String>,
}

/// POST /api/notes
pub async fn register_note(
    State(state): State<AppState>,
    Json(body): Json<RegisterNoteBody>,
) -> Result<Json<Value>, ApiError> {
    let mut missing = Vec::new();
    if body.folder_id.is_none() {
        missing.push("folderId");
    }
    if body.user_id.is_none() {
        missing.push("userId");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let note = NoteRecord {
        id: body.id.unwrap_or_else(Uuid::new_v4),
        folder_id: body.folder_id.unwrap(),
        user_id: body.user_id.unwrap(),
        title: body.title.unwrap_or_default(),
        archived: false,
        created_at: Utc::now(),
    };
    state.storage.insert_note(&note)?;
    Ok(Json(json!({ "success": true, "note": note })))
}

/// POST /api/notes/{id}/archive
pub async fn archive_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.storage.set_note_archived(id, true)?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.storage.delete_note(id)?;
    Ok(Json(json!({ "success": true })))
}
