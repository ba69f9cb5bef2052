//! Test Data Factory
//!
//! Builders for realistic test data:
//! - Questions with arbitrary schedule state and review history
//! - Completed AI review sessions with scores
//! - Pipeline collaborators with scripted behavior

use chrono::{DateTime, Duration, Utc};
use recall_core::model::{
    AiReviewSession, Quality, Question, ReviewEntry, ReviewItem, ReviewScope, SessionResult,
    SessionStatus,
};
use recall_core::{AnswerEvaluator, GeneratedItem, ReviewGenerator};
use uuid::Uuid;

/// Factory for question cards in arbitrary schedule states
pub struct QuestionBuilder {
    question: Question,
}

impl QuestionBuilder {
    pub fn new(note_id: Uuid, user_id: Uuid) -> Self {
        Self {
            question: Question::new(note_id, user_id, "question", "answer"),
        }
    }

    pub fn text(mut self, question: &str, answer: &str) -> Self {
        self.question.question = question.to_string();
        self.question.answer = answer.to_string();
        self
    }

    pub fn schedule(mut self, repetition: u32, interval: u32, ease_factor: f64) -> Self {
        self.question.repetition = repetition;
        self.question.interval = interval;
        self.question.ease_factor = ease_factor;
        self
    }

    pub fn due_at(mut self, next_review: DateTime<Utc>) -> Self {
        self.question.next_review = next_review;
        self
    }

    /// Append a history entry, keeping entries chronological
    pub fn reviewed(mut self, date: DateTime<Utc>, quality: Quality) -> Self {
        self.question.history.push(ReviewEntry { date, quality });
        self.question.last_review = Some(date);
        self
    }

    pub fn build(self) -> Question {
        self.question
    }
}

/// A completed AI review session scoring `correct`/`total`, finished at the
/// given instant
pub fn completed_ai_session(
    user_id: Uuid,
    correct: u32,
    total: u32,
    completed_at: DateTime<Utc>,
) -> AiReviewSession {
    let mut session = AiReviewSession::new(ReviewScope::Folder(Uuid::new_v4()), user_id, None);
    session.requested_at = completed_at - Duration::minutes(10);
    session.advance(SessionStatus::ReadyForReview).unwrap();
    session.advance(SessionStatus::InProgress).unwrap();
    session.advance(SessionStatus::EvaluatingAnswers).unwrap();
    session
        .complete(SessionResult {
            correct_answers: correct,
            total_questions: total,
        })
        .unwrap();
    session.completed_at = Some(completed_at);
    session
}

// ============================================================================
// SCRIPTED PIPELINE COLLABORATORS
// ============================================================================

/// Generator that returns a fixed list of question/answer pairs
pub struct ScriptedGenerator {
    pub items: Vec<GeneratedItem>,
}

impl ScriptedGenerator {
    /// `n` items with answers "answer 0" .. "answer n-1"
    pub fn with_items(n: usize) -> Self {
        Self {
            items: (0..n)
                .map(|i| GeneratedItem {
                    question: format!("generated question {}", i),
                    answer: format!("answer {}", i),
                })
                .collect(),
        }
    }
}

impl ReviewGenerator for ScriptedGenerator {
    fn generate(
        &self,
        _scope: &ReviewScope,
        _difficulty: Option<&str>,
    ) -> Result<Vec<GeneratedItem>, String> {
        Ok(self.items.clone())
    }
}

/// Generator that always fails with the given reason
pub struct FailingGenerator {
    pub reason: String,
}

impl ReviewGenerator for FailingGenerator {
    fn generate(
        &self,
        _scope: &ReviewScope,
        _difficulty: Option<&str>,
    ) -> Result<Vec<GeneratedItem>, String> {
        Err(self.reason.clone())
    }
}

/// Evaluator scoring by exact string match on the expected answer
pub struct ExactEvaluator;

impl AnswerEvaluator for ExactEvaluator {
    fn score(&self, items: &[ReviewItem], answers: &[String]) -> Result<u32, String> {
        Ok(items
            .iter()
            .zip(answers)
            .filter(|(item, answer)| item.answer == **answer)
            .count() as u32)
    }
}
