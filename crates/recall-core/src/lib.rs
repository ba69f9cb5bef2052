//! # Recall Core
//!
//! Spaced-repetition engine for a note-taking study service:
//!
//! - **SM-2 scheduling**: pure interval/ease computation over four recall
//!   ratings (Again / Hard / Good / Easy)
//! - **Review sessions**: a reveal-then-rate state machine over a resolved
//!   question pool, with optimistic schedule persistence
//! - **Statistics**: accuracy, per-day review history, AI review scores,
//!   mastery, and due counts
//! - **AI review pipeline**: asynchronous generate/answer/evaluate sessions
//!   tracked through a persisted status state machine
//! - **SQLite storage**: migration-versioned persistence backing scope
//!   resolution and the collaborator traits above
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recall_core::{Quality, Question, scheduler};
//!
//! let mut question = Question::new(note_id, user_id, "2+2?", "4");
//! let update = scheduler::update_schedule(&question, Quality::Good, chrono::Utc::now());
//! update.apply_to(&mut question);
//! ```

// ============================================================================
// MODULES
// ============================================================================

pub mod model;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Data model
pub use model::{
    AiReviewSession, InvalidTransition, NoteRecord, Quality, Question, ReviewEntry, ReviewItem,
    ReviewMode, ReviewScope, ScopeKind, SessionResult, SessionStatus, DEFAULT_EASE_FACTOR,
};

// SM-2 scheduling
pub use scheduler::{
    preview_intervals, update_schedule, ScheduleUpdate, LAPSE_INTERVAL_DAYS, MIN_EASE_FACTOR,
};

// Review sessions
pub use session::{
    FeedbackFailure, QuestionStore, ReviewSession, ReviewSessionManager, ScopeResolver,
    SessionError, SessionPhase,
};

// Statistics
pub use stats::{
    accuracy, average_ai_score, due_counts, mastery_percentage, next_ai_review_date,
    question_history_by_day, DayBucket, DueCounts, MASTERY_WINDOW,
};

// AI review pipeline
pub use pipeline::{
    AiReviewPipeline, AnswerEvaluator, GeneratedItem, PipelineError, ReviewGenerator, SessionStore,
};

// Storage layer
pub use storage::{Result, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AiReviewPipeline, AiReviewSession, Quality, Question, Result, ReviewMode, ReviewScope,
        ReviewSessionManager, ScheduleUpdate, SessionStatus, Storage, StorageError,
    };
}
