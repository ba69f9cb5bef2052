//! SM-2 Spaced Repetition Scheduler
//!
//! Pure transform from (current schedule state, quality rating, now) to the
//! next schedule state. No I/O; persisting the result is the caller's job.
//!
//! Quality ratings (1-4, matching the four feedback buttons):
//! - 1: Again - could not recall, the card restarts
//! - 2: Hard - recalled with serious difficulty
//! - 3: Good - recalled correctly
//! - 4: Easy - recalled effortlessly

use chrono::{DateTime, Duration, Utc};

use crate::model::{Quality, Question, ReviewEntry};

/// Minimum ease factor; a card can never fail to progress below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Interval (days) after a lapse
pub const LAPSE_INTERVAL_DAYS: u32 = 1;

// Ease deltas per rating, the classic SM-2 update evaluated at q = 3/4/5.
// Tunable constants; the lapse path leaves ease untouched so the restart is
// governed purely by repetition and interval.
const EASE_DELTA_HARD: f64 = -0.14;
const EASE_DELTA_GOOD: f64 = 0.0;
const EASE_DELTA_EASY: f64 = 0.10;

/// Result of scheduling one feedback submission
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUpdate {
    /// New consecutive-success count
    pub repetition: u32,
    /// New interval in days
    pub interval: u32,
    /// New ease factor, clamped to [`MIN_EASE_FACTOR`]
    pub ease_factor: f64,
    /// When the question is due again
    pub next_review: DateTime<Utc>,
    /// The review instant (becomes the question's `last_review`)
    pub last_review: DateTime<Utc>,
    /// The history entry to append for this submission
    pub entry: ReviewEntry,
}

impl ScheduleUpdate {
    /// Apply this update to a question, appending the history entry
    pub fn apply_to(&self, question: &mut Question) {
        question.repetition = self.repetition;
        question.interval = self.interval;
        question.ease_factor = self.ease_factor;
        question.next_review = self.next_review;
        question.last_review = Some(self.last_review);
        question.history.push(self.entry);
    }
}

fn ease_delta(quality: Quality) -> f64 {
    match quality {
        Quality::Again => 0.0,
        Quality::Hard => EASE_DELTA_HARD,
        Quality::Good => EASE_DELTA_GOOD,
        Quality::Easy => EASE_DELTA_EASY,
    }
}

/// Calculate the next schedule state for a question
///
/// Total over its input domain: every (question, quality, now) combination
/// produces a valid update.
pub fn update_schedule(question: &Question, quality: Quality, now: DateTime<Utc>) -> ScheduleUpdate {
    let (repetition, interval, ease_factor) = match quality {
        Quality::Again => {
            // Lapse: the card always restarts one day out
            (0, LAPSE_INTERVAL_DAYS, question.ease_factor.max(MIN_EASE_FACTOR))
        }
        _ => {
            let repetition = question.repetition + 1;
            let interval = if repetition == 1 {
                // First successful recall always lands one day out
                1
            } else {
                ((question.interval as f64 * question.ease_factor).round() as u32).max(1)
            };
            let ease_factor = (question.ease_factor + ease_delta(quality)).max(MIN_EASE_FACTOR);
            (repetition, interval, ease_factor)
        }
    };

    ScheduleUpdate {
        repetition,
        interval,
        ease_factor,
        next_review: now + Duration::days(interval as i64),
        last_review: now,
        entry: ReviewEntry { date: now, quality },
    }
}

/// Interval each of the four ratings would produce, for UI button labels
pub fn preview_intervals(question: &Question) -> [u32; 4] {
    let now = Utc::now();
    [
        update_schedule(question, Quality::Again, now).interval,
        update_schedule(question, Quality::Hard, now).interval,
        update_schedule(question, Quality::Good, now).interval,
        update_schedule(question, Quality::Easy, now).interval,
    ]
}

// ============================================================================
// TESTS
// ============================================================================
