//! Review Session Manager
//!
//! Stateful, in-memory controller for the interactive study loop:
//! question -> reveal -> feedback -> next. Resolves a scope into a question
//! pool, drives the reveal/feedback state machine, runs the scheduler per
//! answer, and reports elapsed-time metrics.
//!
//! Feedback persistence is optimistic: the state machine advances
//! immediately and the write is handed to the store in the background.
//! Failures surface on a non-blocking notification channel; they never roll
//! back session progress or block the next question.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::{Quality, Question, ReviewMode, ReviewScope};
use crate::scheduler::{self, ScheduleUpdate};
use crate::storage::StorageError;

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Resolves a scope into its question pool
///
/// Note scope yields that note's questions; folder scope the union across the
/// folder's non-archived notes; user scope the union across the user's notes.
pub trait ScopeResolver: Send + Sync {
    fn resolve_questions(&self, scope: &ReviewScope) -> crate::storage::Result<Vec<Question>>;
}

/// Persistence collaborator for schedule updates
pub trait QuestionStore: Send + Sync {
    fn save_schedule(&self, question_id: Uuid, update: &ScheduleUpdate)
        -> crate::storage::Result<()>;
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// Where an active session is in the study loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// A question is shown, answer hidden
    AwaitingReveal,
    /// The answer is shown, waiting for a quality rating
    AwaitingFeedback,
    /// No pending questions remain
    Completed,
}

/// Session operation rejected by the state machine
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session has been started
    #[error("no active review session")]
    NoActiveSession,
    /// `show_answer` called while the answer is already shown
    #[error("answer is already revealed")]
    AnswerAlreadyRevealed,
    /// `submit_feedback` called before the answer was revealed
    #[error("answer must be revealed before submitting feedback")]
    AnswerNotRevealed,
    /// The session has no pending questions left
    #[error("review session is already complete")]
    SessionComplete,
    /// Scope resolution failed
    #[error("failed to resolve review scope: {0}")]
    Resolve(#[from] StorageError),
}

/// A persistence failure surfaced from the background write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackFailure {
    pub question_id: Uuid,
    pub error: String,
}

/// An in-flight review session
///
/// Ephemeral and never persisted as a row; already-submitted feedback for
/// prior questions stays persisted even if the session is discarded.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub mode: ReviewMode,
    pub scope: ReviewScope,
    /// Resolved question pool, in stable pool order
    questions: Vec<Question>,
    /// Ids still pending, monotonically shrinking, pool order preserved
    remaining: Vec<Uuid>,
    /// The question currently shown; always a member of `questions` while
    /// the session is active
    current: Option<Uuid>,
    phase: SessionPhase,
    pub started_at: DateTime<Utc>,
    pub current_question_started_at: DateTime<Utc>,
}

impl ReviewSession {
    /// The resolved question pool
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Ids still pending in this session
    pub fn remaining(&self) -> &[Uuid] {
        &self.remaining
    }

    /// The question currently shown, if any
    pub fn current_question(&self) -> Option<&Question> {
        let id = self.current?;
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// A session is complete iff no pending questions remain
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

// ============================================================================
// MANAGER
// ============================================================================

/// Drives one review session at a time
///
/// Constructed explicitly and handed to whoever needs it; there is no
/// ambient global session. With no session started the manager is idle;
/// `start` resolves a pool and enters the loop, `end_session` discards the
/// session from any state.
pub struct ReviewSessionManager {
    resolver: Arc<dyn ScopeResolver>,
    store: Arc<dyn QuestionStore>,
    failures: mpsc::UnboundedSender<FeedbackFailure>,
    session: Option<ReviewSession>,
}

impl ReviewSessionManager {
    /// Create an idle manager and the receiving end of its failure channel
    pub fn new(
        resolver: Arc<dyn ScopeResolver>,
        store: Arc<dyn QuestionStore>,
    ) -> (Self, mpsc::UnboundedReceiver<FeedbackFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                resolver,
                store,
                failures: tx,
                session: None,
            },
            rx,
        )
    }

    /// Start a review session, discarding any session already in flight
    ///
    /// An empty resolved pool yields `Completed` immediately; the session
    /// never enters `AwaitingReveal` without a current question.
    pub fn start(
        &mut self,
        mode: ReviewMode,
        scope: ReviewScope,
        now: DateTime<Utc>,
    ) -> Result<SessionPhase, SessionError> {
        let mut questions = self.resolver.resolve_questions(&scope)?;
        if mode == ReviewMode::Due {
            questions.retain(|q| q.is_due(now));
        }

        let remaining: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let current = remaining.first().copied();
        let phase = if current.is_some() {
            SessionPhase::AwaitingReveal
        } else {
            SessionPhase::Completed
        };

        tracing::debug!(
            mode = %mode,
            scope = %scope.kind(),
            pool = questions.len(),
            "review session started"
        );

        self.session = Some(ReviewSession {
            mode,
            scope,
            questions,
            remaining,
            current,
            phase,
            started_at: now,
            current_question_started_at: now,
        });
        Ok(phase)
    }

    /// The active session, if any
    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    /// Phase of the active session; `None` while idle
    pub fn phase(&self) -> Option<SessionPhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    /// The question currently shown
    pub fn current_question(&self) -> Option<&Question> {
        self.session.as_ref()?.current_question()
    }

    /// Reveal the current question's answer
    pub fn show_answer(&mut self) -> Result<&Question, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        match session.phase {
            SessionPhase::AwaitingReveal => {
                session.phase = SessionPhase::AwaitingFeedback;
                session.current_question().ok_or(SessionError::SessionComplete)
            }
            SessionPhase::AwaitingFeedback => Err(SessionError::AnswerAlreadyRevealed),
            SessionPhase::Completed => Err(SessionError::SessionComplete),
        }
    }

    /// Submit a quality rating for the current question and advance
    ///
    /// Runs the scheduler, applies the update to the in-memory copy, queues
    /// the persistence write, removes the question from the pending set, and
    /// selects the next question (or completes the session).
    pub fn submit_feedback(
        &mut self,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<SessionPhase, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        match session.phase {
            SessionPhase::AwaitingReveal => return Err(SessionError::AnswerNotRevealed),
            SessionPhase::Completed => return Err(SessionError::SessionComplete),
            SessionPhase::AwaitingFeedback => {}
        }

        let current_id = session.current.ok_or(SessionError::SessionComplete)?;
        let question = session
            .questions
            .iter_mut()
            .find(|q| q.id == current_id)
            .ok_or(SessionError::SessionComplete)?;

        let update = scheduler::update_schedule(question, quality, now);
        update.apply_to(question);

        // Optimistic: state advances now, the write reconciles in the
        // background and failures surface on the channel.
        Self::persist_schedule(&self.store, &self.failures, current_id, update);

        session.remaining.retain(|id| *id != current_id);
        session.current = session.remaining.first().copied();
        session.phase = if session.current.is_some() {
            session.current_question_started_at = now;
            SessionPhase::AwaitingReveal
        } else {
            SessionPhase::Completed
        };
        Ok(session.phase)
    }

    /// Discard the in-memory session from any state
    ///
    /// Already-issued persistence writes are not cancelled or rolled back.
    pub fn end_session(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("review session ended");
        }
    }

    /// Time since the session started
    pub fn session_elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.session.as_ref().map(|s| now - s.started_at)
    }

    /// Time since the current question became current
    pub fn current_question_elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.session
            .as_ref()
            .filter(|s| s.current.is_some())
            .map(|s| now - s.current_question_started_at)
    }

    fn persist_schedule(
        store: &Arc<dyn QuestionStore>,
        failures: &mpsc::UnboundedSender<FeedbackFailure>,
        question_id: Uuid,
        update: ScheduleUpdate,
    ) {
        let store = Arc::clone(store);
        let failures = failures.clone();
        let write = move || {
            if let Err(e) = store.save_schedule(question_id, &update) {
                tracing::warn!("failed to persist schedule for {}: {}", question_id, e);
                let _ = failures.send(FeedbackFailure {
                    question_id,
                    error: e.to_string(),
                });
            }
        };

        // Inside a runtime the write goes to the blocking pool; without one
        // (library embedders, unit tests) it runs inline.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(write);
            }
            Err(_) => write(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
