// src/engine/difficulty.rs

use crate::config::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};

/// Computes the target difficulty for the next question.
///
/// Priority of signals:
/// 1. (prior difficulty, correctness) mid-attempt: one bounded step up on a
///    correct answer, one bounded step down on an incorrect one.
/// 2. A prior aggregate/placement score at attempt start: mapped through
///    fixed, monotonic score bands.
/// 3. No signal at all: the fixed middle level.
///
/// Total function; the result is always within [MIN_LEVEL, MAX_LEVEL].
pub fn next_difficulty(
    prior_difficulty: Option<i16>,
    was_correct: Option<bool>,
    prior_score: Option<i64>,
) -> i16 {
    match (prior_difficulty, was_correct) {
        (Some(prior), Some(correct)) => {
            let prior = prior.clamp(MIN_LEVEL, MAX_LEVEL);
            if correct {
                (prior + 1).min(MAX_LEVEL)
            } else {
                (prior - 1).max(MIN_LEVEL)
            }
        }
        _ => match prior_score {
            Some(score) => level_for_score(score),
            None => DEFAULT_LEVEL,
        },
    }
}

/// Maps a percentage score to a starting level. Monotonic non-decreasing.
fn level_for_score(score: i64) -> i16 {
    if score < 25 {
        1
    } else if score < 50 {
        2
    } else if score < 70 {
        3
    } else if score < 85 {
        4
    } else {
        5
    }
}
