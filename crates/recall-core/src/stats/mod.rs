//! Statistics Aggregator
//!
//! Pure, read-only functions over collections of questions and AI review
//! sessions. Nothing here mutates records or touches storage; callers load
//! the data and hand it in.
//!
//! Calendar bucketing uses UTC days. The server aggregates for many clients
//! at once, so there is no single "local" timezone to bucket in.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AiReviewSession, Question, SessionStatus};

/// How many recent completed sessions the mastery metric looks at
pub const MASTERY_WINDOW: usize = 3;

// ============================================================================
// ACCURACY
// ============================================================================

/// Percentage of all history entries that were successful recalls
///
/// Returns 0.0 when no history exists anywhere.
pub fn accuracy(questions: &[Question]) -> f64 {
    let mut total = 0usize;
    let mut correct = 0usize;
    for question in questions {
        for entry in &question.history {
            total += 1;
            if entry.quality.is_correct() {
                correct += 1;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// PER-DAY HISTORY
// ============================================================================

/// One calendar day of review activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    /// Feedback submissions on that day
    pub count: usize,
    /// Per-day accuracy percentage
    pub accuracy: f64,
}

/// Group every history entry by calendar day, ascending
///
/// Entries on the same day merge into one bucket regardless of time.
pub fn question_history_by_day(questions: &[Question]) -> Vec<DayBucket> {
    let mut by_day: std::collections::BTreeMap<NaiveDate, (usize, usize)> =
        std::collections::BTreeMap::new();

    for question in questions {
        for entry in &question.history {
            let day = entry.date.date_naive();
            let bucket = by_day.entry(day).or_insert((0, 0));
            bucket.0 += 1;
            if entry.quality.is_correct() {
                bucket.1 += 1;
            }
        }
    }

    by_day
        .into_iter()
        .map(|(date, (count, correct))| DayBucket {
            date,
            count,
            accuracy: correct as f64 / count as f64 * 100.0,
        })
        .collect()
}

// ============================================================================
// AI SESSION SCORES
// ============================================================================

fn completed_scores(sessions: &[AiReviewSession]) -> Vec<(DateTime<Utc>, f64)> {
    let mut scored: Vec<(DateTime<Utc>, f64)> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .filter_map(|s| {
            s.result
                .map(|r| (s.completed_at.unwrap_or(s.requested_at), r.normalized()))
        })
        .collect();
    scored.sort_by_key(|(date, _)| *date);
    scored
}

/// Mean normalized score (0.0..=1.0) over completed sessions; 0.0 if none
pub fn average_ai_score(sessions: &[AiReviewSession]) -> f64 {
    let scores = completed_scores(sessions);
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64
    }
}

/// Average AI score as a percentage
pub fn average_ai_score_percent(sessions: &[AiReviewSession]) -> f64 {
    average_ai_score(sessions) * 100.0
}

/// Average AI score on the 0-10 display scale
pub fn average_ai_score_out_of_ten(sessions: &[AiReviewSession]) -> f64 {
    average_ai_score(sessions) * 10.0
}

/// Recency-weighted mastery percentage
///
/// Mean of the last `recent_n` completed sessions' normalized scores, in
/// chronological order by completion date. Older sessions outside the window
/// do not affect mastery; with fewer than `recent_n` completed sessions, all
/// of them count.
pub fn mastery_percentage(sessions: &[AiReviewSession], recent_n: usize) -> f64 {
    let scores = completed_scores(sessions);
    if scores.is_empty() || recent_n == 0 {
        return 0.0;
    }
    let window: Vec<f64> = scores
        .iter()
        .rev()
        .take(recent_n)
        .map(|(_, s)| *s)
        .collect();
    window.iter().sum::<f64>() / window.len() as f64 * 100.0
}

// ============================================================================
// DUE COUNTS
// ============================================================================

/// Questions due today and tomorrow, by calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCounts {
    /// Next review falls on or before today
    pub due_today: usize,
    /// Next review falls exactly on tomorrow's calendar day
    pub due_tomorrow: usize,
}

/// Count due-today and due-tomorrow questions relative to `today`
pub fn due_counts(questions: &[Question], today: NaiveDate) -> DueCounts {
    let tomorrow = today + Duration::days(1);
    let mut counts = DueCounts { due_today: 0, due_tomorrow: 0 };
    for question in questions {
        let due_day = question.next_review.date_naive();
        if due_day <= today {
            counts.due_today += 1;
        } else if due_day == tomorrow {
            counts.due_tomorrow += 1;
        }
    }
    counts
}

// ============================================================================
// NEXT AI REVIEW DATE
// ============================================================================

/// When the next AI review should happen, derived from the last completed
/// session's score on the 0-10 scale
///
/// Buckets: score < 5 -> +1 day, < 7 -> +3 days, < 9 -> +7 days, else
/// +14 days, added to the last session's completion date. `None` means no
/// completed session exists and the caller treats the user as ready now.
pub fn next_ai_review_date(last_completed: Option<&AiReviewSession>) -> Option<DateTime<Utc>> {
    let session = last_completed.filter(|s| s.status == SessionStatus::Completed)?;
    let result = session.result?;
    let completed_at = session.completed_at?;

    let score = result.out_of_ten();
    let days = if score < 5.0 {
        1
    } else if score < 7.0 {
        3
    } else if score < 9.0 {
        7
    } else {
        14
    };
    Some(completed_at + Duration::days(days))
}

// ============================================================================
// TESTS
// ============================================================================
