//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: questions, notes, AI review sessions",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Soft-delete for questions",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id TEXT PRIMARY KEY,
    note_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    created_at TEXT NOT NULL,

    -- SM-2 schedule state
    repetition INTEGER NOT NULL DEFAULT 0,
    interval_days INTEGER NOT NULL DEFAULT 0,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    next_review TEXT NOT NULL,
    last_review TEXT,

    -- Append-only review history, JSON array of {date, quality}
    history TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_questions_note ON questions(note_id);
CREATE INDEX IF NOT EXISTS idx_questions_user ON questions(user_id);
CREATE INDEX IF NOT EXISTS idx_questions_next_review ON questions(next_review);

-- Minimal note registry: only what scope resolution reads
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    folder_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_folder ON notes(folder_id);
CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id);

CREATE TABLE IF NOT EXISTS ai_review_sessions (
    id TEXT PRIMARY KEY,
    source_id TEXT NOT NULL,
    source_type TEXT NOT NULL,  -- 'note', 'folder', 'user'
    user_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    difficulty TEXT,
    requested_at TEXT NOT NULL,
    completed_at TEXT,
    error TEXT,

    -- Result, present only for completed sessions
    correct_answers INTEGER,
    total_questions INTEGER
);

CREATE INDEX IF NOT EXISTS idx_ai_sessions_user ON ai_review_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_ai_sessions_status ON ai_review_sessions(status);
CREATE INDEX IF NOT EXISTS idx_ai_sessions_requested ON ai_review_sessions(requested_at);

CREATE TABLE IF NOT EXISTS ai_review_items (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES ai_review_sessions(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ai_items_session ON ai_review_items(session_id);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Soft-delete for questions
/// A deleted question disappears from every read path but its row survives,
/// so accidental deletes do not destroy review history.
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE questions ADD COLUMN deleted_at TEXT;

CREATE INDEX IF NOT EXISTS idx_questions_deleted ON questions(deleted_at);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
