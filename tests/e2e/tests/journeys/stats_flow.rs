//! Statistics journey
//!
//! Seeds realistic review history and AI session records through real
//! storage, then checks the aggregate numbers a dashboard would show.

use chrono::{Duration, TimeZone, Utc};
use recall_core::model::Quality;
use recall_core::{stats, SessionStore};
use recall_e2e_tests::harness::TestDatabaseManager;
use recall_e2e_tests::mocks::fixtures::{completed_ai_session, QuestionBuilder};
use uuid::Uuid;

#[test]
fn test_accuracy_and_day_buckets_from_stored_history() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let note = db.seed_note(Uuid::new_v4(), user, "Physics");

    let monday = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let wednesday = Utc.with_ymd_and_hms(2026, 3, 4, 20, 30, 0).unwrap();

    // Monday: 2 reviews, one lapse. Wednesday: 2 reviews, both correct.
    let momentum = QuestionBuilder::new(note.id, user)
        .text("p = ?", "mv")
        .reviewed(monday, Quality::Again)
        .reviewed(wednesday, Quality::Good)
        .build();
    let energy = QuestionBuilder::new(note.id, user)
        .text("E = ?", "mc^2")
        .reviewed(monday, Quality::Good)
        .reviewed(wednesday + Duration::hours(1), Quality::Easy)
        .build();
    db.seed_question(&momentum);
    db.seed_question(&energy);

    let questions = db.storage.questions_for_user(user).unwrap();
    assert_eq!(questions.len(), 2);

    // 3 correct out of 4 submissions
    assert!((stats::accuracy(&questions) - 75.0).abs() < 1e-9);

    let buckets = stats::question_history_by_day(&questions);
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].date, monday.date_naive());
    assert_eq!(buckets[0].count, 2);
    assert!((buckets[0].accuracy - 50.0).abs() < 1e-9);
    assert_eq!(buckets[1].date, wednesday.date_naive());
    assert_eq!(buckets[1].count, 2);
    assert!((buckets[1].accuracy - 100.0).abs() < 1e-9);
}

#[test]
fn test_due_counts_over_stored_pool() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let note = db.seed_note(Uuid::new_v4(), user, "Dates");

    let now = Utc::now();
    let today = now.date_naive();
    db.seed_question(&QuestionBuilder::new(note.id, user).due_at(now - Duration::days(2)).build());
    db.seed_question(&QuestionBuilder::new(note.id, user).due_at(now).build());
    db.seed_question(
        &QuestionBuilder::new(note.id, user).due_at(now + Duration::days(1)).build(),
    );
    db.seed_question(
        &QuestionBuilder::new(note.id, user).due_at(now + Duration::days(5)).build(),
    );

    let questions = db.storage.questions_for_user(user).unwrap();
    let counts = stats::due_counts(&questions, today);
    // Overdue counts as due today
    assert_eq!(counts.due_today, 2);
    assert_eq!(counts.due_tomorrow, 1);
}

#[test]
fn test_ai_scores_and_mastery_window() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();

    let base = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
    // Oldest session is poor; the three most recent are strong
    let scores = [(1u32, 5u32), (4, 5), (5, 5), (4, 5)];
    for (i, (correct, total)) in scores.iter().enumerate() {
        let session =
            completed_ai_session(user, *correct, *total, base + Duration::days(i as i64));
        db.storage.insert_session(&session).unwrap();
    }

    let sessions = db.storage.ai_sessions_for_user(user).unwrap();
    assert_eq!(sessions.len(), 4);

    // Overall average includes the poor session: (0.2+0.8+1.0+0.8)/4
    assert!((stats::average_ai_score(&sessions) - 0.7).abs() < 1e-9);
    assert!((stats::average_ai_score_out_of_ten(&sessions) - 7.0).abs() < 1e-9);

    // Mastery looks only at the last 3: (0.8+1.0+0.8)/3
    let mastery = stats::mastery_percentage(&sessions, stats::MASTERY_WINDOW);
    assert!((mastery - 86.666666666666).abs() < 1e-6);
}

#[test]
fn test_next_ai_review_date_tracks_last_score() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();

    assert_eq!(stats::next_ai_review_date(None), None);

    let completed_at = Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0).unwrap();
    // 9/10 earns the longest interval
    let strong = completed_ai_session(user, 9, 10, completed_at);
    db.storage.insert_session(&strong).unwrap();

    let sessions = db.storage.ai_sessions_for_user(user).unwrap();
    let next = stats::next_ai_review_date(sessions.first());
    assert_eq!(next, Some(completed_at + Duration::days(14)));

    // A weak score pulls the next review in close
    let weak = completed_ai_session(user, 2, 10, completed_at + Duration::days(14));
    assert_eq!(
        stats::next_ai_review_date(Some(&weak)),
        Some(completed_at + Duration::days(15)),
    );
}

#[test]
fn test_soft_deleted_questions_leave_statistics() {
    let db = TestDatabaseManager::new_temp();
    let user = Uuid::new_v4();
    let note = db.seed_note(Uuid::new_v4(), user, "Cleanup");

    let kept = QuestionBuilder::new(note.id, user)
        .reviewed(Utc::now() - Duration::days(1), Quality::Good)
        .build();
    let removed = QuestionBuilder::new(note.id, user)
        .reviewed(Utc::now() - Duration::days(1), Quality::Again)
        .build();
    db.seed_question(&kept);
    db.seed_question(&removed);
    db.storage.delete_question(removed.id).unwrap();

    let questions = db.storage.questions_for_user(user).unwrap();
    assert_eq!(questions.len(), 1);
    assert!((stats::accuracy(&questions) - 100.0).abs() < 1e-9);
}
