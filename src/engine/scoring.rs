// src/engine/scoring.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::attempt::AnswerRecord;
use crate::models::skill::Skill;

/// Per-skill and overall percentage scores for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateScores {
    /// Always carries all four skills; a skill with no answers scores 0.
    pub per_skill: BTreeMap<Skill, i64>,
    /// Mean of the four per-skill percentages, rounded.
    pub overall: i64,
}

/// Folds an answer list into per-skill and overall percentages.
///
/// Answers are grouped by the primary skill of their snapshotted weights.
/// Recomputed from scratch on every call; no incremental counters, so
/// answer revision can never drift the totals.
pub fn aggregate(answers: &[AnswerRecord]) -> AggregateScores {
    let mut tallies: BTreeMap<Skill, (i64, i64)> = BTreeMap::new();
    for answer in answers {
        let tally = tallies.entry(answer.primary_skill()).or_insert((0, 0));
        tally.1 += 1;
        if answer.correct {
            tally.0 += 1;
        }
    }

    let mut per_skill = BTreeMap::new();
    let mut total = 0i64;
    for skill in Skill::ALL {
        let pct = match tallies.get(&skill) {
            Some(&(correct, answered)) if answered > 0 => {
                (100.0 * correct as f64 / answered as f64).round() as i64
            }
            _ => 0,
        };
        total += pct;
        per_skill.insert(skill, pct);
    }

    let overall = (total as f64 / Skill::ALL.len() as f64).round() as i64;

    AggregateScores { per_skill, overall }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_id: i64, skill: Skill, correct: bool) -> AnswerRecord {
        let mut skill_weights = BTreeMap::new();
        skill_weights.insert(skill, 1.0);
        AnswerRecord {
            question_id,
            chosen_index: 0,
            correct,
            difficulty: 3,
            skill_weights,
        }
    }

    #[test]
    fn empty_answer_list_scores_all_zero() {
        let scores = aggregate(&[]);
        for skill in Skill::ALL {
            assert_eq!(scores.per_skill[&skill], 0);
        }
        assert_eq!(scores.overall, 0);
    }

    #[test]
    fn one_correct_listening_one_wrong_grasping() {
        // Scenario from the dashboard: listening 100, grasping 0, the two
        // unassessed skills 0, overall 25.
        let answers = vec![
            answer(1, Skill::Listening, true),
            answer(2, Skill::Grasping, false),
        ];
        let scores = aggregate(&answers);

        assert_eq!(scores.per_skill[&Skill::Listening], 100);
        assert_eq!(scores.per_skill[&Skill::Grasping], 0);
        assert_eq!(scores.per_skill[&Skill::Retention], 0);
        assert_eq!(scores.per_skill[&Skill::Application], 0);
        assert_eq!(scores.overall, 25);
    }

    #[test]
    fn per_skill_percentage_is_rounded() {
        let answers = vec![
            answer(1, Skill::Retention, true),
            answer(2, Skill::Retention, true),
            answer(3, Skill::Retention, false),
        ];
        let scores = aggregate(&answers);
        // 2/3 -> 66.67 -> 67
        assert_eq!(scores.per_skill[&Skill::Retention], 67);
    }

    #[test]
    fn zero_answer_skill_never_divides_by_zero() {
        let answers = vec![answer(1, Skill::Application, true)];
        let scores = aggregate(&answers);
        assert_eq!(scores.per_skill[&Skill::Listening], 0);
        assert_eq!(scores.overall, 25);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let answers = vec![
            answer(1, Skill::Listening, true),
            answer(2, Skill::Listening, false),
            answer(3, Skill::Grasping, true),
            answer(4, Skill::Retention, false),
        ];
        assert_eq!(aggregate(&answers), aggregate(&answers));
    }

    #[test]
    fn multi_skill_answer_counts_toward_primary_only() {
        let mut skill_weights = BTreeMap::new();
        skill_weights.insert(Skill::Listening, 0.8);
        skill_weights.insert(Skill::Retention, 0.2);
        let answers = vec![AnswerRecord {
            question_id: 1,
            chosen_index: 0,
            correct: true,
            difficulty: 3,
            skill_weights,
        }];
        let scores = aggregate(&answers);
        assert_eq!(scores.per_skill[&Skill::Listening], 100);
        assert_eq!(scores.per_skill[&Skill::Retention], 0);
    }
}
