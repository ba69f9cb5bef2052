//! SQLite Storage Implementation
//!
//! Persistence layer for questions, the note registry, and AI review
//! sessions. Serves as the scope resolver and schedule outbox for the
//! session manager and as the session store for the AI pipeline.

use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::model::{
    AiReviewSession, NoteRecord, Question, ReviewEntry, ReviewItem, ReviewScope, ScopeKind,
    SessionResult, SessionStatus,
};
use crate::pipeline::SessionStore;
use crate::scheduler::ScheduleUpdate;
use crate::session::{QuestionStore, ScopeResolver};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// History serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed storage
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self` (not `&mut self`), making Storage `Send + Sync`
/// so the HTTP layer can use `Arc<Storage>` instead of `Arc<Mutex<Storage>>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Create new storage instance
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "recall", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("recall.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".to_string()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".to_string()))
    }

    // ========================================================================
    // QUESTIONS
    // ========================================================================

    /// Insert a question row
    pub fn insert_question(&self, question: &Question) -> Result<()> {
        let history_json = serde_json::to_string(&question.history)?;
        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO questions (
                id, note_id, user_id, question, answer, created_at,
                repetition, interval_days, ease_factor, next_review, last_review,
                history
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                question.id.to_string(),
                question.note_id.to_string(),
                question.user_id.to_string(),
                question.question,
                question.answer,
                question.created_at,
                question.repetition,
                question.interval,
                question.ease_factor,
                question.next_review,
                question.last_review,
                history_json,
            ],
        )?;
        Ok(())
    }

    /// Fetch a question by id; deleted questions are invisible
    pub fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
        let reader = self.reader()?;
        reader
            .query_row(
                &format!(
                    "SELECT {QUESTION_COLUMNS} FROM questions
                     WHERE id = ?1 AND deleted_at IS NULL"
                ),
                params![id.to_string()],
                row_to_question,
            )
            .optional()
            .map_err(StorageError::from)
    }

    /// All live questions belonging to a note, in stable pool order
    pub fn questions_for_note(&self, note_id: Uuid) -> Result<Vec<Question>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE note_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at, id"
        ))?;
        let questions = stmt
            .query_map(params![note_id.to_string()], row_to_question)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    /// All live questions owned by a user, in stable pool order
    pub fn questions_for_user(&self, user_id: Uuid) -> Result<Vec<Question>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE user_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at, id"
        ))?;
        let questions = stmt
            .query_map(params![user_id.to_string()], row_to_question)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    /// Live questions across a folder's non-archived notes, in stable pool
    /// order
    pub fn questions_for_folder(&self, folder_id: Uuid) -> Result<Vec<Question>> {
        let reader = self.reader()?;
        let qualified_columns = QUESTION_COLUMNS
            .split(',')
            .map(|c| format!("q.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = reader.prepare(&format!(
            "SELECT {qualified_columns} FROM questions q
             JOIN notes n ON n.id = q.note_id
             WHERE n.folder_id = ?1 AND n.archived = 0 AND q.deleted_at IS NULL
             ORDER BY q.created_at, q.id"
        ))?;
        let questions = stmt
            .query_map(params![folder_id.to_string()], row_to_question)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    /// Soft-delete a question; the row survives with its review history
    pub fn delete_question(&self, id: Uuid) -> Result<()> {
        let writer = self.writer()?;
        let changed = writer.execute(
            "UPDATE questions SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![Utc::now(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("question {}", id)));
        }
        Ok(())
    }

    /// Write a scheduler update: last-write-wins on the schedule columns,
    /// one entry appended to the history array
    pub fn apply_schedule(&self, question_id: Uuid, update: &ScheduleUpdate) -> Result<()> {
        let writer = self.writer()?;
        let history_json: String = writer
            .query_row(
                "SELECT history FROM questions WHERE id = ?1 AND deleted_at IS NULL",
                params![question_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("question {}", question_id)))?;

        let mut history: Vec<ReviewEntry> = serde_json::from_str(&history_json)?;
        history.push(update.entry);
        let history_json = serde_json::to_string(&history)?;

        writer.execute(
            "UPDATE questions SET
                repetition = ?1, interval_days = ?2, ease_factor = ?3,
                next_review = ?4, last_review = ?5, history = ?6
             WHERE id = ?7",
            params![
                update.repetition,
                update.interval,
                update.ease_factor,
                update.next_review,
                update.last_review,
                history_json,
                question_id.to_string(),
            ],
        )?;
        Ok(())
    }

    // ========================================================================
    // NOTE REGISTRY
    // ========================================================================

    /// Register a note for scope resolution
    pub fn insert_note(&self, note: &NoteRecord) -> Result<()> {
        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO notes (id, folder_id, user_id, title, archived, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id.to_string(),
                note.folder_id.to_string(),
                note.user_id.to_string(),
                note.title,
                note.archived,
                note.created_at,
            ],
        )?;
        Ok(())
    }

    /// Fetch a registered note
    pub fn get_note(&self, id: Uuid) -> Result<Option<NoteRecord>> {
        let reader = self.reader()?;
        reader
            .query_row(
                "SELECT id, folder_id, user_id, title, archived, created_at
                 FROM notes WHERE id = ?1",
                params![id.to_string()],
                row_to_note,
            )
            .optional()
            .map_err(StorageError::from)
    }

    /// Flip a note's archived flag; archived notes drop out of folder scopes
    pub fn set_note_archived(&self, id: Uuid, archived: bool) -> Result<()> {
        let writer = self.writer()?;
        let changed = writer.execute(
            "UPDATE notes SET archived = ?1 WHERE id = ?2",
            params![archived, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("note {}", id)));
        }
        Ok(())
    }

    /// Remove a note and soft-delete its questions
    pub fn delete_note(&self, id: Uuid) -> Result<()> {
        let writer = self.writer()?;
        let changed = writer.execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("note {}", id)));
        }
        writer.execute(
            "UPDATE questions SET deleted_at = ?1 WHERE note_id = ?2 AND deleted_at IS NULL",
            params![Utc::now(), id.to_string()],
        )?;
        Ok(())
    }

    // ========================================================================
    // AI REVIEW SESSIONS
    // ========================================================================

    /// Completed and in-flight AI sessions for a user, oldest request first
    pub fn ai_sessions_for_user(&self, user_id: Uuid) -> Result<Vec<AiReviewSession>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM ai_review_sessions
             WHERE user_id = ?1
             ORDER BY requested_at, id"
        ))?;
        let sessions = stmt
            .query_map(params![user_id.to_string()], row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    fn write_session(&self, sql: &str, session: &AiReviewSession) -> Result<usize> {
        let (correct, total) = match &session.result {
            Some(r) => (Some(r.correct_answers), Some(r.total_questions)),
            None => (None, None),
        };
        let writer = self.writer()?;
        Ok(writer.execute(
            sql,
            params![
                session.id.to_string(),
                session.source_id.to_string(),
                session.source_type.as_str(),
                session.user_id.to_string(),
                session.status.as_str(),
                session.difficulty,
                session.requested_at,
                session.completed_at,
                session.error,
                correct,
                total,
            ],
        )?)
    }
}

const QUESTION_COLUMNS: &str = "id, note_id, user_id, question, answer, created_at, \
     repetition, interval_days, ease_factor, next_review, last_review, history";

const SESSION_COLUMNS: &str = "id, source_id, source_type, user_id, status, difficulty, \
     requested_at, completed_at, error, correct_answers, total_questions";

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_question(row: &Row<'_>) -> rusqlite::Result<Question> {
    let history_json: String = row.get(11)?;
    let history: Vec<ReviewEntry> = serde_json::from_str(&history_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Question {
        id: uuid_column(row, 0)?,
        note_id: uuid_column(row, 1)?,
        user_id: uuid_column(row, 2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        created_at: row.get(5)?,
        repetition: row.get(6)?,
        interval: row.get(7)?,
        ease_factor: row.get(8)?,
        next_review: row.get(9)?,
        last_review: row.get(10)?,
        history,
    })
}

fn row_to_note(row: &Row<'_>) -> rusqlite::Result<NoteRecord> {
    Ok(NoteRecord {
        id: uuid_column(row, 0)?,
        folder_id: uuid_column(row, 1)?,
        user_id: uuid_column(row, 2)?,
        title: row.get(3)?,
        archived: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<AiReviewSession> {
    let kind: String = row.get(2)?;
    let status: String = row.get(4)?;
    let status = SessionStatus::parse_name(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown session status: {}", status).into(),
        )
    })?;

    let correct: Option<u32> = row.get(9)?;
    let total: Option<u32> = row.get(10)?;
    let result = match (correct, total) {
        (Some(correct_answers), Some(total_questions)) => Some(SessionResult {
            correct_answers,
            total_questions,
        }),
        _ => None,
    };

    Ok(AiReviewSession {
        id: uuid_column(row, 0)?,
        source_id: uuid_column(row, 1)?,
        source_type: ScopeKind::parse_name(&kind),
        user_id: uuid_column(row, 3)?,
        status,
        difficulty: row.get(5)?,
        requested_at: row.get(6)?,
        completed_at: row.get(7)?,
        error: row.get(8)?,
        result,
    })
}

// ============================================================================
// COLLABORATOR TRAIT IMPLS
// ============================================================================

impl ScopeResolver for Storage {
    fn resolve_questions(&self, scope: &ReviewScope) -> Result<Vec<Question>> {
        match scope {
            ReviewScope::Note(id) => self.questions_for_note(*id),
            ReviewScope::Folder(id) => self.questions_for_folder(*id),
            ReviewScope::User(id) => self.questions_for_user(*id),
        }
    }
}

impl QuestionStore for Storage {
    fn save_schedule(&self, question_id: Uuid, update: &ScheduleUpdate) -> Result<()> {
        self.apply_schedule(question_id, update)
    }
}

impl SessionStore for Storage {
    fn insert_session(&self, session: &AiReviewSession) -> Result<()> {
        self.write_session(
            "INSERT INTO ai_review_sessions (
                id, source_id, source_type, user_id, status, difficulty,
                requested_at, completed_at, error, correct_answers, total_questions
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            session,
        )?;
        Ok(())
    }

    fn update_session(&self, session: &AiReviewSession) -> Result<()> {
        let changed = self.write_session(
            "UPDATE ai_review_sessions SET
                source_id = ?2, source_type = ?3, user_id = ?4, status = ?5,
                difficulty = ?6, requested_at = ?7, completed_at = ?8,
                error = ?9, correct_answers = ?10, total_questions = ?11
             WHERE id = ?1",
            session,
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("session {}", session.id)));
        }
        Ok(())
    }

    fn get_session(&self, id: Uuid) -> Result<Option<AiReviewSession>> {
        let reader = self.reader()?;
        reader
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM ai_review_sessions WHERE id = ?1"),
                params![id.to_string()],
                row_to_session,
            )
            .optional()
            .map_err(StorageError::from)
    }

    fn insert_items(&self, items: &[ReviewItem]) -> Result<()> {
        let writer = self.writer()?;
        let mut stmt = writer.prepare(
            "INSERT INTO ai_review_items (id, session_id, position, question, answer)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for item in items {
            stmt.execute(params![
                item.id.to_string(),
                item.session_id.to_string(),
                item.position,
                item.question,
                item.answer,
            ])?;
        }
        Ok(())
    }

    fn session_items(&self, session_id: Uuid) -> Result<Vec<ReviewItem>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, session_id, position, question, answer
             FROM ai_review_items WHERE session_id = ?1
             ORDER BY position",
        )?;
        let items = stmt
            .query_map(params![session_id.to_string()], |row| {
                Ok(ReviewItem {
                    id: uuid_column(row, 0)?,
                    session_id: uuid_column(row, 1)?,
                    position: row.get(2)?,
                    question: row.get(3)?,
                    answer: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn unfinished_sessions(&self, user_id: Uuid) -> Result<Vec<AiReviewSession>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM ai_review_sessions
             WHERE user_id = ?1 AND status NOT IN ('completed', 'failed')
             ORDER BY requested_at DESC, id"
        ))?;
        let sessions = stmt
            .query_map(params![user_id.to_string()], row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }
}

// ============================================================================
// TESTS
// ============================================================================
