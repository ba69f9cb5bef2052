//! AiReviewSession - one AI-assisted review attempt
//!
//! The session record is the source of truth for resumability: status moves
//! through a one-directional state machine and every transition is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ReviewScope, ScopeKind};

// ============================================================================
// STATUS STATE MACHINE
// ============================================================================

/// Lifecycle status of an AI review session
///
/// Transitions are one-directional; `Completed` and `Failed` are terminal.
/// There is no in-place retry of a failed session - the only recovery path is
/// requesting a brand-new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Generation job is running server-side
    #[default]
    Pending,
    /// Questions generated, waiting for the user to open the session
    ReadyForReview,
    /// User is answering
    InProgress,
    /// Scoring job is running server-side
    EvaluatingAnswers,
    /// Scored successfully; the result is populated
    Completed,
    /// Generation or scoring failed (terminal)
    Failed,
}

/// Rejected status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session status transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

impl SessionStatus {
    /// Convert to the wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::ReadyForReview => "ready_for_review",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::EvaluatingAnswers => "evaluating_answers",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// Parse from the wire/database string
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "ready_for_review" => Some(SessionStatus::ReadyForReview),
            "in_progress" => Some(SessionStatus::InProgress),
            "evaluating_answers" => Some(SessionStatus::EvaluatingAnswers),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }

    /// Terminal statuses never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Whether moving to `next` is a legal transition
    pub fn can_transition(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Pending, ReadyForReview)
                | (Pending, Failed)
                | (ReadyForReview, InProgress)
                | (InProgress, EvaluatingAnswers)
                | (EvaluatingAnswers, Completed)
                | (EvaluatingAnswers, Failed)
        )
    }

    /// Checked transition, rejecting anything the state machine forbids
    pub fn transition(self, next: SessionStatus) -> Result<SessionStatus, InvalidTransition> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SESSION RECORD
// ============================================================================

/// Final score of a completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub correct_answers: u32,
    pub total_questions: u32,
}

impl SessionResult {
    /// Normalized score in 0.0..=1.0; an empty session scores 0
    pub fn normalized(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.total_questions as f64
        }
    }

    /// Score on the 0-10 display scale
    pub fn out_of_ten(&self) -> f64 {
        self.normalized() * 10.0
    }
}

/// One AI-assisted review attempt, scoped to a note, folder, or user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReviewSession {
    /// Unique identifier (UUID v4)
    pub id: Uuid,
    /// What the session draws questions from
    pub source_id: Uuid,
    /// Kind of the source (note, folder, user)
    pub source_type: ScopeKind,
    /// Requesting user, used for unfinished-session discovery
    pub user_id: Uuid,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// Optional difficulty tag forwarded to the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// When the user requested the session
    pub requested_at: DateTime<Utc>,
    /// When the session reached a terminal status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure reason when status is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Score, present only once `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SessionResult>,
}

impl AiReviewSession {
    /// Create a new pending session for the given scope
    pub fn new(scope: ReviewScope, user_id: Uuid, difficulty: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: scope.id(),
            source_type: scope.kind(),
            user_id,
            status: SessionStatus::Pending,
            difficulty,
            requested_at: Utc::now(),
            completed_at: None,
            error: None,
            result: None,
        }
    }

    /// The scope this session was requested for
    pub fn scope(&self) -> ReviewScope {
        ReviewScope::from_parts(self.source_type, self.source_id)
    }

    /// Advance the status through the checked state machine
    pub fn advance(&mut self, next: SessionStatus) -> Result<(), InvalidTransition> {
        self.status = self.status.transition(next)?;
        if self.status.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Move to `completed` with the final score
    pub fn complete(&mut self, result: SessionResult) -> Result<(), InvalidTransition> {
        self.advance(SessionStatus::Completed)?;
        self.result = Some(result);
        Ok(())
    }

    /// Move to terminal `failed` with a reason
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), InvalidTransition> {
        self.advance(SessionStatus::Failed)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

// ============================================================================
// GENERATED ITEMS
// ============================================================================

/// One generated question/answer pair attached to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: Uuid,
    pub session_id: Uuid,
    /// Zero-based display order; answers are submitted in this order
    pub position: u32,
    pub question: String,
    pub answer: String,
}

impl ReviewItem {
    /// Create an item at the given position in a session
    pub fn new(
        session_id: Uuid,
        position: u32,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            position,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
