//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded notes and question pools
//! - Concurrent test isolation

use std::path::PathBuf;
use std::sync::Arc;

use recall_core::model::{NoteRecord, Question};
use recall_core::Storage;
use tempfile::TempDir;
use uuid::Uuid;

/// Manager for test databases
///
/// Creates an isolated database instance per test to prevent interference.
/// The temporary directory (and database) is deleted when the manager drops.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let note = db.seed_note(folder_id, user_id, "Biology");
/// let ids = db.seed_questions(note.id, user_id, 5);
/// ```
pub struct TestDatabaseManager {
    /// The storage instance, shared so collaborator traits can borrow it
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_recall.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Register a note in the given folder
    pub fn seed_note(&self, folder_id: Uuid, user_id: Uuid, title: &str) -> NoteRecord {
        let note = NoteRecord::new(folder_id, user_id, title);
        self.storage
            .insert_note(&note)
            .expect("Failed to seed note");
        note
    }

    /// Seed fresh (due-immediately) questions under a note
    pub fn seed_questions(&self, note_id: Uuid, user_id: Uuid, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let question = Question::new(
                note_id,
                user_id,
                format!("question {}", i),
                format!("answer {}", i),
            );
            self.storage
                .insert_question(&question)
                .expect("Failed to seed question");
            ids.push(question.id);
        }
        ids
    }

    /// Seed a single fully specified question
    pub fn seed_question(&self, question: &Question) {
        self.storage
            .insert_question(question)
            .expect("Failed to seed question");
    }
}
