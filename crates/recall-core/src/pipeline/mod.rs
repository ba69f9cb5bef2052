//! AI Review Pipeline
//!
//! Asynchronous, server-tracked state machine per AI review session:
//! generation -> ready -> in-progress -> evaluation -> completed/failed.
//! The persisted session record is the source of truth for resumability; a
//! user can navigate away and come back via the session id.
//!
//! There is no in-place retry of a failed session. Recovery is always a
//! brand-new session: fail-forward, not fail-retry.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::model::{
    AiReviewSession, InvalidTransition, ReviewItem, ReviewScope, SessionResult, SessionStatus,
};
use crate::storage::StorageError;

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// A freshly generated question/answer pair, before it is attached to a
/// session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedItem {
    pub question: String,
    pub answer: String,
}

/// Generation job collaborator: turns a scope's content into review items
///
/// Runs on the blocking pool; an implementation backed by a remote model is
/// free to block on its own client. Errors are reason strings persisted on
/// the failed session.
pub trait ReviewGenerator: Send + Sync {
    fn generate(
        &self,
        scope: &ReviewScope,
        difficulty: Option<&str>,
    ) -> std::result::Result<Vec<GeneratedItem>, String>;
}

/// Scoring job collaborator: counts correct answers for a submitted session
pub trait AnswerEvaluator: Send + Sync {
    fn score(&self, items: &[ReviewItem], answers: &[String]) -> std::result::Result<u32, String>;
}

/// Persistence collaborator for session records and their generated items
pub trait SessionStore: Send + Sync {
    fn insert_session(&self, session: &AiReviewSession) -> crate::storage::Result<()>;
    fn update_session(&self, session: &AiReviewSession) -> crate::storage::Result<()>;
    fn get_session(&self, id: Uuid) -> crate::storage::Result<Option<AiReviewSession>>;
    fn insert_items(&self, items: &[ReviewItem]) -> crate::storage::Result<()>;
    fn session_items(&self, session_id: Uuid) -> crate::storage::Result<Vec<ReviewItem>>;
    /// Sessions not yet completed/failed, most recent request first
    fn unfinished_sessions(&self, user_id: Uuid) -> crate::storage::Result<Vec<AiReviewSession>>;
}

// ============================================================================
// ERRORS
// ============================================================================

/// Pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Session id does not exist
    #[error("review session not found: {0}")]
    NotFound(Uuid),
    /// Operation illegal in the session's current status
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Submitted answer count does not match the generated items
    #[error("expected {expected} answers, got {got}")]
    AnswerCount { expected: usize, got: usize },
    /// Persistence failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Pipeline result type
pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================================
// PIPELINE
// ============================================================================

/// Drives AI review sessions through their lifecycle
///
/// Generation and scoring run as background jobs; clients discover their
/// completion by polling session status. Concurrent pipelines for different
/// sessions are fully independent.
pub struct AiReviewPipeline {
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn ReviewGenerator>,
    evaluator: Arc<dyn AnswerEvaluator>,
}

impl AiReviewPipeline {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ReviewGenerator>,
        evaluator: Arc<dyn AnswerEvaluator>,
    ) -> Self {
        Self { store, generator, evaluator }
    }

    /// Request a new AI review: persists a `pending` session and kicks off
    /// the generation job
    pub fn request(
        &self,
        scope: ReviewScope,
        user_id: Uuid,
        difficulty: Option<String>,
    ) -> Result<AiReviewSession> {
        let session = AiReviewSession::new(scope, user_id, difficulty);
        self.store.insert_session(&session)?;

        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let session_id = session.id;
        Self::spawn_job(move || Self::run_generation(store, generator, session_id));

        Ok(session)
    }

    /// The user opened the session and started answering
    pub fn begin(&self, session_id: Uuid) -> Result<AiReviewSession> {
        let mut session = self.load(session_id)?;
        session.advance(SessionStatus::InProgress)?;
        self.store.update_session(&session)?;
        Ok(session)
    }

    /// The user submitted all answers: persists `evaluating_answers` and
    /// kicks off the scoring job
    ///
    /// Answers are matched to items by position, so the count must equal the
    /// generated item count.
    pub fn submit_answers(&self, session_id: Uuid, answers: Vec<String>) -> Result<AiReviewSession> {
        let mut session = self.load(session_id)?;
        let items = self.store.session_items(session_id)?;
        if answers.len() != items.len() {
            return Err(PipelineError::AnswerCount {
                expected: items.len(),
                got: answers.len(),
            });
        }
        session.advance(SessionStatus::EvaluatingAnswers)?;
        self.store.update_session(&session)?;

        let store = Arc::clone(&self.store);
        let evaluator = Arc::clone(&self.evaluator);
        Self::spawn_job(move || Self::run_evaluation(store, evaluator, session_id, answers));

        Ok(session)
    }

    /// Poll a session's current state
    pub fn status(&self, session_id: Uuid) -> Result<AiReviewSession> {
        self.load(session_id)
    }

    /// Generated items for a session, in display order
    pub fn items(&self, session_id: Uuid) -> Result<Vec<ReviewItem>> {
        Ok(self.store.session_items(session_id)?)
    }

    /// Resumable sessions for a user, most recent request first
    pub fn unfinished(&self, user_id: Uuid) -> Result<Vec<AiReviewSession>> {
        Ok(self.store.unfinished_sessions(user_id)?)
    }

    fn load(&self, session_id: Uuid) -> Result<AiReviewSession> {
        self.store
            .get_session(session_id)?
            .ok_or(PipelineError::NotFound(session_id))
    }

    /// Run a job on the blocking pool, or inline when no runtime is present
    fn spawn_job<F: FnOnce() + Send + 'static>(job: F) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }

    fn run_generation(
        store: Arc<dyn SessionStore>,
        generator: Arc<dyn ReviewGenerator>,
        session_id: Uuid,
    ) {
        let mut session = match store.get_session(session_id) {
            Ok(Some(s)) => s,
            Ok(None) => {
                warn!("generation job: session {} vanished", session_id);
                return;
            }
            Err(e) => {
                warn!("generation job: failed to load session {}: {}", session_id, e);
                return;
            }
        };

        let outcome = generator.generate(&session.scope(), session.difficulty.as_deref());
        let transition = match outcome {
            Ok(items) if items.is_empty() => {
                session.fail("source content produced no review questions")
            }
            Ok(items) => {
                let rows: Vec<ReviewItem> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        ReviewItem::new(session_id, i as u32, item.question, item.answer)
                    })
                    .collect();
                match store.insert_items(&rows) {
                    Ok(()) => session.advance(SessionStatus::ReadyForReview),
                    Err(e) => session.fail(format!("failed to store generated questions: {}", e)),
                }
            }
            Err(reason) => session.fail(reason),
        };

        if let Err(e) = transition {
            // Only possible if the record advanced concurrently
            warn!("generation job: session {}: {}", session_id, e);
            return;
        }
        if let Err(e) = store.update_session(&session) {
            warn!("generation job: failed to persist session {}: {}", session_id, e);
        }
    }

    fn run_evaluation(
        store: Arc<dyn SessionStore>,
        evaluator: Arc<dyn AnswerEvaluator>,
        session_id: Uuid,
        answers: Vec<String>,
    ) {
        let mut session = match store.get_session(session_id) {
            Ok(Some(s)) => s,
            Ok(None) => {
                warn!("evaluation job: session {} vanished", session_id);
                return;
            }
            Err(e) => {
                warn!("evaluation job: failed to load session {}: {}", session_id, e);
                return;
            }
        };
        let items = match store.session_items(session_id) {
            Ok(items) => items,
            Err(e) => {
                warn!("evaluation job: failed to load items for {}: {}", session_id, e);
                return;
            }
        };

        let transition = match evaluator.score(&items, &answers) {
            Ok(correct) => session.complete(SessionResult {
                correct_answers: correct,
                total_questions: items.len() as u32,
            }),
            Err(reason) => session.fail(reason),
        };

        if let Err(e) = transition {
            warn!("evaluation job: session {}: {}", session_id, e);
            return;
        }
        if let Err(e) = store.update_session(&session) {
            warn!("evaluation job: failed to persist session {}: {}", session_id, e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
