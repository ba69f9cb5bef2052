//! Data Model
//!
//! Core record types shared by the scheduler, session manager, statistics
//! aggregator, and AI review pipeline:
//! - Question: one spaced-repetition item with its schedule state and history
//! - AiReviewSession: one server-tracked AI review attempt
//! - ReviewScope / ReviewMode: what a review session draws from and how

mod ai_session;
mod question;

pub use ai_session::{
    AiReviewSession, InvalidTransition, ReviewItem, SessionResult, SessionStatus,
};
pub use question::{Quality, Question, ReviewEntry, DEFAULT_EASE_FACTOR};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// SCOPE AND MODE
// ============================================================================

/// The kind of collection a review session draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// A single note's questions
    #[default]
    Note,
    /// All questions across a folder's non-archived notes
    Folder,
    /// All questions owned by a user
    User,
}

impl ScopeKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Note => "note",
            ScopeKind::Folder => "folder",
            ScopeKind::User => "user",
        }
    }

    /// Parse from string name, defaulting unknown names to `Note`
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "folder" => ScopeKind::Folder,
            "user" => ScopeKind::User,
            _ => ScopeKind::Note,
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully-resolved review scope: the kind plus the id it points at
///
/// Modeled as a tagged variant so scope handling goes through one resolver
/// instead of ad hoc branching at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReviewScope {
    /// Questions belonging to one note
    Note(Uuid),
    /// Questions across all non-archived notes in a folder
    Folder(Uuid),
    /// Questions across all notes owned by a user
    User(Uuid),
}

impl ReviewScope {
    /// Build a scope from its wire parts
    pub fn from_parts(kind: ScopeKind, id: Uuid) -> Self {
        match kind {
            ScopeKind::Note => ReviewScope::Note(id),
            ScopeKind::Folder => ReviewScope::Folder(id),
            ScopeKind::User => ReviewScope::User(id),
        }
    }

    /// The scope kind discriminant
    pub fn kind(&self) -> ScopeKind {
        match self {
            ReviewScope::Note(_) => ScopeKind::Note,
            ReviewScope::Folder(_) => ScopeKind::Folder,
            ReviewScope::User(_) => ScopeKind::User,
        }
    }

    /// The id the scope points at
    pub fn id(&self) -> Uuid {
        match self {
            ReviewScope::Note(id) | ReviewScope::Folder(id) | ReviewScope::User(id) => *id,
        }
    }
}

/// Which questions within a scope a review session keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// Only questions whose next review date has arrived
    #[default]
    Due,
    /// Every question in scope regardless of due date
    All,
}

impl ReviewMode {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewMode::Due => "due",
            ReviewMode::All => "all",
        }
    }

}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// NOTE REGISTRY
// ============================================================================

/// Minimal note record used for scope resolution
///
/// Note content, rich text, and sharing live in the document service; the
/// engine only tracks ownership and the archived flag so folder and user
/// scopes can be resolved to question pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: Uuid,
    pub folder_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub archived: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NoteRecord {
    /// Create a new note record in the given folder
    pub fn new(folder_id: Uuid, user_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            folder_id,
            user_id,
            title: title.into(),
            archived: false,
            created_at: chrono::Utc::now(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
