// src/engine/selector.rs

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::models::question::Question;

/// Picks the next question from a candidate pool.
///
/// Candidates are expected to span `target ± 1` (the store layer widens the
/// band so a thin exact-difficulty pool does not starve selection). Any
/// candidate whose id is in `excluded` is filtered out first.
///
/// With an adaptive signal present, selection is deterministic: an exact
/// difficulty match wins; otherwise the closest difficulty, preferring the
/// lower level and then the lower id. Without a signal (first question of an
/// attempt) the pick is uniformly random via the injected `rng`, so tests
/// can seed it.
///
/// Returns `None` when the filtered pool is empty. That is a legitimate
/// outcome (exhausted bank), not an error.
pub fn select_question<R: Rng + ?Sized>(
    candidates: &[Question],
    target_difficulty: i16,
    excluded: &HashSet<i64>,
    adaptive: bool,
    rng: &mut R,
) -> Option<Question> {
    let pool: Vec<&Question> = candidates
        .iter()
        .filter(|q| !excluded.contains(&q.id))
        .collect();

    if pool.is_empty() {
        return None;
    }

    if !adaptive {
        return pool.choose(rng).copied().cloned();
    }

    pool.into_iter()
        .min_by_key(|q| {
            (
                (q.difficulty - target_difficulty).abs(),
                q.difficulty,
                q.id,
            )
        })
        .cloned()
}
