//! Question - the fundamental unit of spaced repetition
//!
//! Each question belongs to a note and carries:
//! - Question and answer text
//! - SM-2 schedule state (repetition, interval, ease factor, review dates)
//! - An append-only, chronological review history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default ease factor for a freshly authored question
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

// ============================================================================
// QUALITY RATING
// ============================================================================

/// User's self-assessed recall score, matching the four feedback buttons
///
/// There is no intermediate grading; the UI exposes exactly these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Quality {
    /// Could not recall; the card restarts
    Again,
    /// Recalled with serious difficulty
    Hard,
    /// Recalled correctly
    Good,
    /// Recalled effortlessly
    Easy,
}

impl Quality {
    /// Parse from the wire integer (1-4)
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Quality::Again),
            2 => Some(Quality::Hard),
            3 => Some(Quality::Good),
            4 => Some(Quality::Easy),
            _ => None,
        }
    }

    /// The wire integer (1-4)
    pub fn as_i32(&self) -> i32 {
        match self {
            Quality::Again => 1,
            Quality::Hard => 2,
            Quality::Good => 3,
            Quality::Easy => 4,
        }
    }

    /// Whether this rating counts as a successful recall
    pub fn is_correct(&self) -> bool {
        !matches!(self, Quality::Again)
    }

    /// Human-readable button label
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Again => "Again",
            Quality::Hard => "Hard",
            Quality::Good => "Good",
            Quality::Easy => "Easy",
        }
    }
}

impl From<Quality> for i32 {
    fn from(q: Quality) -> i32 {
        q.as_i32()
    }
}

impl TryFrom<i32> for Quality {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Quality::from_i32(value).ok_or_else(|| format!("quality must be 1-4, got {}", value))
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// REVIEW HISTORY
// ============================================================================

/// One past feedback submission for a question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// When the feedback was submitted
    pub date: DateTime<Utc>,
    /// The rating the user gave
    pub quality: Quality,
}

// ============================================================================
// QUESTION
// ============================================================================

/// A spaced-repetition question owned by a note
///
/// Schedule state is mutated only by applying the scheduler's output on
/// feedback submission; history is append-only and chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier (UUID v4)
    pub id: Uuid,
    /// Owning note
    pub note_id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Question text shown before reveal
    pub question: String,
    /// Answer text shown after reveal
    pub answer: String,
    /// When the question card was authored
    #[serde(rename = "timeStamp")]
    pub created_at: DateTime<Utc>,

    // ========== SM-2 schedule state ==========
    /// Count of consecutive successful recalls (resets on a lapse)
    #[serde(default)]
    pub repetition: u32,
    /// Current review interval in days
    #[serde(default)]
    pub interval: u32,
    /// SM-2 ease factor, never below 1.3
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// When the question is next due
    pub next_review: DateTime<Utc>,
    /// When the question was last reviewed, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,

    /// Ordered feedback history, oldest first
    #[serde(default)]
    pub history: Vec<ReviewEntry>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl Question {
    /// Create a new question, due immediately
    pub fn new(
        note_id: Uuid,
        user_id: Uuid,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            note_id,
            user_id,
            question: question.into(),
            answer: answer.into(),
            created_at: now,
            repetition: 0,
            interval: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review: now,
            last_review: None,
            history: Vec::new(),
        }
    }

    /// Check if the question is due at the given instant
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

// ============================================================================
// TESTS
// ============================================================================
