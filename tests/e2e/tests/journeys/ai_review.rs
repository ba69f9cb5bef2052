//! AI review pipeline journey
//!
//! Drives the full request -> generate -> answer -> score lifecycle against
//! real SQLite storage. These tests run without a Tokio runtime, so the
//! generation and evaluation jobs execute inline and every assertion sees
//! the final persisted state.

use std::sync::Arc;

use recall_core::model::{ReviewScope, SessionStatus};
use recall_core::{AiReviewPipeline, SessionStore};
use recall_e2e_tests::harness::TestDatabaseManager;
use recall_e2e_tests::mocks::fixtures::{ExactEvaluator, FailingGenerator, ScriptedGenerator};
use uuid::Uuid;

fn pipeline_with_generator(
    db: &TestDatabaseManager,
    generator: impl recall_core::ReviewGenerator + 'static,
) -> AiReviewPipeline {
    AiReviewPipeline::new(
        db.storage.clone(),
        Arc::new(generator),
        Arc::new(ExactEvaluator),
    )
}

#[test]
fn test_full_lifecycle_scores_four_of_five() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let pipeline = pipeline_with_generator(&db, ScriptedGenerator::with_items(5));

    let session = pipeline
        .request(ReviewScope::Folder(Uuid::new_v4()), user, None)
        .unwrap();

    // Generation ran inline: items are persisted and the session is ready
    let ready = pipeline.status(session.id).unwrap();
    assert_eq!(ready.status, SessionStatus::ReadyForReview);
    let items = pipeline.items(session.id).unwrap();
    assert_eq!(items.len(), 5);
    for (position, item) in items.iter().enumerate() {
        assert_eq!(item.position, position as u32);
    }

    pipeline.begin(session.id).unwrap();

    // Four exact answers, one wrong
    let mut answers: Vec<String> = (0..5).map(|i| format!("answer {}", i)).collect();
    answers[2] = "not even close".to_string();
    pipeline.submit_answers(session.id, answers).unwrap();

    let done = pipeline.status(session.id).unwrap();
    assert_eq!(done.status, SessionStatus::Completed);
    assert!(done.completed_at.is_some());
    let result = done.result.unwrap();
    assert_eq!(result.correct_answers, 4);
    assert_eq!(result.total_questions, 5);
}

#[test]
fn test_generation_failure_lands_in_failed() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let pipeline = pipeline_with_generator(
        &db,
        FailingGenerator {
            reason: "model unavailable".to_string(),
        },
    );

    let session = pipeline
        .request(ReviewScope::User(user), user, None)
        .unwrap();

    let failed = pipeline.status(session.id).unwrap();
    assert_eq!(failed.status, SessionStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("model unavailable"));

    // A failed session cannot be started
    assert!(pipeline.begin(session.id).is_err());
}

#[test]
fn test_answer_count_mismatch_keeps_session_in_progress() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let pipeline = pipeline_with_generator(&db, ScriptedGenerator::with_items(3));

    let session = pipeline
        .request(ReviewScope::Folder(Uuid::new_v4()), user, None)
        .unwrap();
    pipeline.begin(session.id).unwrap();

    let err = pipeline
        .submit_answers(session.id, vec!["only one".to_string()])
        .unwrap_err();
    assert!(err.to_string().contains("expected 3"));

    // Still answerable after the rejected submission
    let current = pipeline.status(session.id).unwrap();
    assert_eq!(current.status, SessionStatus::InProgress);
    let answers = vec!["answer 0".to_string(), "x".to_string(), "x".to_string()];
    pipeline.submit_answers(session.id, answers).unwrap();
    assert_eq!(
        pipeline.status(session.id).unwrap().status,
        SessionStatus::Completed
    );
}

#[test]
fn test_unfinished_excludes_terminal_sessions() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let other_user = Uuid::new_v4();
    let pipeline = pipeline_with_generator(&db, ScriptedGenerator::with_items(2));

    let resumable = pipeline
        .request(ReviewScope::User(user), user, Some("easy".to_string()))
        .unwrap();

    // One session runs through to completion
    let finished = pipeline
        .request(ReviewScope::User(user), user, None)
        .unwrap();
    pipeline.begin(finished.id).unwrap();
    pipeline
        .submit_answers(
            finished.id,
            vec!["answer 0".to_string(), "answer 1".to_string()],
        )
        .unwrap();

    // Another user's session never shows up
    pipeline
        .request(ReviewScope::User(other_user), other_user, None)
        .unwrap();

    let unfinished = pipeline.unfinished(user).unwrap();
    assert_eq!(unfinished.len(), 1);
    assert_eq!(unfinished[0].id, resumable.id);
    assert_eq!(unfinished[0].difficulty.as_deref(), Some("easy"));
}

#[test]
fn test_items_survive_process_restart() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let pipeline = pipeline_with_generator(&db, ScriptedGenerator::with_items(4));

    let session = pipeline
        .request(ReviewScope::Folder(Uuid::new_v4()), user, None)
        .unwrap();
    drop(pipeline);

    // A fresh pipeline over the same storage resumes where the old one left off
    let reopened = pipeline_with_generator(&db, ScriptedGenerator::with_items(4));
    assert_eq!(
        reopened.status(session.id).unwrap().status,
        SessionStatus::ReadyForReview
    );
    assert_eq!(reopened.items(session.id).unwrap().len(), 4);

    // The raw storage trait sees the same rows
    let stored = db.storage.get_session(session.id).unwrap().unwrap();
    assert_eq!(stored.user_id, user);
}
