//! Dashboard statistics endpoint

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::Utc;
use recall_core::model::SessionStatus;
use recall_core::stats;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    user_id: Option<Uuid>,
}

/// GET /api/stats?userId=…
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Value>, ApiError> {
    let user_id = params
        .user_id
        .ok_or(ApiError::MissingFields(vec!["userId"]))?;

    let questions = state.storage.questions_for_user(user_id)?;
    let sessions = state.storage.ai_sessions_for_user(user_id)?;

    let today = Utc::now().date_naive();
    let due = stats::due_counts(&questions, today);
    let last_completed = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .max_by_key(|s| s.completed_at.unwrap_or(s.requested_at));

    Ok(Json(json!({
        "success": true,
        "stats": {
            "totalQuestions": questions.len(),
            "accuracy": stats::accuracy(&questions),
            "history": stats::question_history_by_day(&questions),
            "dueToday": due.due_today,
            "dueTomorrow": due.due_tomorrow,
            "averageAiScore": stats::average_ai_score_percent(&sessions),
            "averageAiScoreOutOfTen": stats::average_ai_score_out_of_ten(&sessions),
            "mastery": stats::mastery_percentage(&sessions, stats::MASTERY_WINDOW),
            "nextAiReviewDate": stats::next_ai_review_date(last_completed),
        },
    })))
}
