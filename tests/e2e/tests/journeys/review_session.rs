//! Interactive review session journey
//!
//! Full study workflow against real SQLite storage: seed notes and
//! questions, run a session end to end, and verify the schedule state and
//! history that landed on disk.

use chrono::{Duration, Utc};
use recall_core::model::{Quality, ReviewMode, ReviewScope};
use recall_core::session::SessionPhase;
use recall_core::ReviewSessionManager;
use recall_e2e_tests::harness::TestDatabaseManager;
use recall_e2e_tests::mocks::fixtures::QuestionBuilder;
use uuid::Uuid;

#[test]
fn test_folder_session_reviews_every_question_once() {
    let db = TestDatabaseManager::new_temp();
    let folder = Uuid::new_v4();
    let user = Uuid::new_v4();

    // Two notes in the folder: 3 + 2 questions
    let biology = db.seed_note(folder, user, "Biology");
    let chemistry = db.seed_note(folder, user, "Chemistry");
    db.seed_questions(biology.id, user, 3);
    db.seed_questions(chemistry.id, user, 2);

    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    let now = Utc::now();
    let phase = manager
        .start(ReviewMode::All, ReviewScope::Folder(folder), now)
        .unwrap();
    assert_eq!(phase, SessionPhase::AwaitingReveal);
    assert_eq!(manager.session().unwrap().questions().len(), 5);

    // Study loop: reveal then rate, five times
    let qualities = [
        Quality::Good,
        Quality::Again,
        Quality::Easy,
        Quality::Hard,
        Quality::Good,
    ];
    let mut reviewed = Vec::new();
    for quality in qualities {
        reviewed.push(manager.current_question().unwrap().id);
        manager.show_answer().unwrap();
        manager.submit_feedback(quality, now).unwrap();
    }
    assert_eq!(manager.phase(), Some(SessionPhase::Completed));

    // Every question was shown exactly once
    let mut unique = reviewed.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);

    // Persisted state reflects each rating
    for (id, quality) in reviewed.iter().zip(qualities) {
        let q = db.storage.get_question(*id).unwrap().unwrap();
        assert_eq!(q.history.len(), 1);
        if quality == Quality::Again {
            assert_eq!(q.repetition, 0);
            assert_eq!(q.interval, 1);
        } else {
            assert_eq!(q.repetition, 1);
            assert_eq!(q.interval, 1);
        }
        assert_eq!(q.last_review, Some(now));
        assert!(q.next_review > now);
    }
}

#[test]
fn test_due_mode_reviews_only_due_questions() {
    let db = TestDatabaseManager::new_temp();
    let folder = Uuid::new_v4();
    let user = Uuid::new_v4();
    let note = db.seed_note(folder, user, "History");

    let now = Utc::now();
    let due = QuestionBuilder::new(note.id, user)
        .text("due now", "yes")
        .due_at(now - Duration::hours(1))
        .build();
    let later = QuestionBuilder::new(note.id, user)
        .text("due next week", "no")
        .schedule(2, 6, 2.5)
        .due_at(now + Duration::days(6))
        .build();
    db.seed_question(&due);
    db.seed_question(&later);

    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    manager
        .start(ReviewMode::Due, ReviewScope::Note(note.id), now)
        .unwrap();

    let session = manager.session().unwrap();
    assert_eq!(session.remaining(), &[due.id]);

    manager.show_answer().unwrap();
    let phase = manager.submit_feedback(Quality::Good, now).unwrap();
    assert_eq!(phase, SessionPhase::Completed);

    // The not-yet-due question was untouched
    let untouched = db.storage.get_question(later.id).unwrap().unwrap();
    assert!(untouched.history.is_empty());
}

#[test]
fn test_archived_notes_leave_folder_scope() {
    let db = TestDatabaseManager::new_temp();
    let folder = Uuid::new_v4();
    let user = Uuid::new_v4();

    let active = db.seed_note(folder, user, "Active");
    let shelved = db.seed_note(folder, user, "Shelved");
    db.seed_questions(active.id, user, 2);
    db.seed_questions(shelved.id, user, 2);
    db.storage.set_note_archived(shelved.id, true).unwrap();

    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    manager
        .start(ReviewMode::All, ReviewScope::Folder(folder), Utc::now())
        .unwrap();
    assert_eq!(manager.session().unwrap().questions().len(), 2);

    // User scope still sees everything the user owns
    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    manager
        .start(ReviewMode::All, ReviewScope::User(user), Utc::now())
        .unwrap();
    assert_eq!(manager.session().unwrap().questions().len(), 4);
}

#[test]
fn test_empty_due_pool_completes_without_error() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let note = db.seed_note(Uuid::new_v4(), user, "Fresh");

    let now = Utc::now();
    let scheduled_out = QuestionBuilder::new(note.id, user)
        .due_at(now + Duration::days(3))
        .build();
    db.seed_question(&scheduled_out);

    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    let phase = manager
        .start(ReviewMode::Due, ReviewScope::Note(note.id), now)
        .unwrap();
    assert_eq!(phase, SessionPhase::Completed);
    assert!(manager.session().unwrap().is_complete());
}

#[test]
fn test_ended_session_keeps_submitted_feedback() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let note = db.seed_note(Uuid::new_v4(), user, "Partial");
    let ids = db.seed_questions(note.id, user, 3);

    let (mut manager, _failures) =
        ReviewSessionManager::new(db.storage.clone(), db.storage.clone());
    let now = Utc::now();
    manager
        .start(ReviewMode::All, ReviewScope::Note(note.id), now)
        .unwrap();

    // Answer the first question, then walk away
    let first = manager.current_question().unwrap().id;
    manager.show_answer().unwrap();
    manager.submit_feedback(Quality::Easy, now).unwrap();
    manager.end_session();
    assert!(manager.session().is_none());

    let reviewed = db.storage.get_question(first).unwrap().unwrap();
    assert_eq!(reviewed.history.len(), 1);

    // The other two questions are still untouched and reviewable later
    for id in ids.iter().filter(|id| **id != first) {
        let q = db.storage.get_question(*id).unwrap().unwrap();
        assert!(q.history.is_empty());
    }
}
