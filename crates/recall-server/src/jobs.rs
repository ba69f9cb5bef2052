//! Built-in AI pipeline collaborators
//!
//! The pipeline's generator and evaluator are trait objects so a deployment
//! can plug in a model-backed implementation. The built-ins here are the
//! self-contained fallback: generation draws from the questions already
//! stored in the scope, evaluation is normalized exact matching.

use std::sync::Arc;

use recall_core::model::{ReviewItem, ReviewScope};
use recall_core::session::ScopeResolver;
use recall_core::{AnswerEvaluator, GeneratedItem, ReviewGenerator, Storage};

/// Upper bound on questions per generated review
const MAX_REVIEW_ITEMS: usize = 10;

/// Generates a review from the scope's existing question cards
pub struct ExtractiveGenerator {
    storage: Arc<Storage>,
}

impl ExtractiveGenerator {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl ReviewGenerator for ExtractiveGenerator {
    fn generate(
        &self,
        scope: &ReviewScope,
        difficulty: Option<&str>,
    ) -> Result<Vec<GeneratedItem>, String> {
        let questions = self
            .storage
            .resolve_questions(scope)
            .map_err(|e| format!("scope resolution failed: {}", e))?;
        if questions.is_empty() {
            return Err("no questions exist in the requested scope".to_string());
        }

        // "easy" trims the set; other difficulty tags are passed through for
        // model-backed generators and ignored here
        let limit = match difficulty {
            Some("easy") => MAX_REVIEW_ITEMS / 2,
            _ => MAX_REVIEW_ITEMS,
        };

        Ok(questions
            .into_iter()
            .take(limit)
            .map(|q| GeneratedItem {
                question: q.question,
                answer: q.answer,
            })
            .collect())
    }
}

/// Scores answers by normalized exact match
pub struct ExactMatchEvaluator;

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl AnswerEvaluator for ExactMatchEvaluator {
    fn score(&self, items: &[ReviewItem], answers: &[String]) -> Result<u32, String> {
        Ok(items
            .iter()
            .zip(answers)
            .filter(|(item, answer)| normalize(&item.answer) == normalize(answer))
            .count() as u32)
    }
}
