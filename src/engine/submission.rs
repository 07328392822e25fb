// src/engine/submission.rs

use sqlx::types::Json;

use crate::config::{SKIP_SENTINEL, WEAK_SKILL_THRESHOLD};
use crate::engine::{policy, scoring, scoring::AggregateScores};
use crate::error::AppError;
use crate::models::attempt::{AnswerRecord, Attempt};
use crate::models::question::Question;
use crate::models::skill::Skill;

/// Result of one answer submission, echoed back to the client.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub aggregate: AggregateScores,
    pub answer_count: usize,
    pub completed: bool,
}

/// Applies one answer to an attempt: the Open -> Completed state machine in
/// pure form.
///
/// Rejects submission against a completed attempt and out-of-bounds chosen
/// indexes (never clamps). On success the record is merged by question id,
/// the aggregate is recomputed from the full merged list, and the attempt
/// auto-completes when the distinct-answer count reaches the expected total.
///
/// Must be called inside the store transaction holding the attempt row, so
/// the whole check-merge-recompute sequence is atomic.
pub fn apply_answer(
    attempt: &mut Attempt,
    question: &Question,
    chosen_index: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<SubmitOutcome, AppError> {
    if attempt.is_completed() {
        return Err(AppError::Conflict(format!(
            "Attempt {} is already completed",
            attempt.id
        )));
    }

    let option_count = question.options.len() as i32;
    let correct = if chosen_index == SKIP_SENTINEL {
        false
    } else if chosen_index < 0 || chosen_index >= option_count {
        return Err(AppError::BadRequest(format!(
            "Chosen index {} is out of bounds for {} options",
            chosen_index, option_count
        )));
    } else {
        chosen_index == question.correct_index
    };

    attempt.merge_answer(AnswerRecord {
        question_id: question.id,
        chosen_index,
        correct,
        difficulty: question.difficulty,
        skill_weights: question.skill_weights.0.clone(),
    });

    let aggregate = scoring::aggregate(&attempt.answers);
    attempt.skill_scores = Some(Json(aggregate.per_skill.clone()));
    attempt.overall_score = Some(aggregate.overall);

    let answer_count = attempt.answer_count();
    let completed = policy::reached_expected_count(answer_count, attempt.expected_question_count);
    if completed {
        attempt.completed_at = Some(now);
    }

    Ok(SubmitOutcome {
        correct,
        aggregate,
        answer_count,
        completed,
    })
}

/// Forces the Completed transition and returns the final scores plus the
/// weak-skill list. Idempotent: an already-completed attempt keeps its
/// completion timestamp and just has its aggregate re-derived from the
/// stored answers.
pub fn finalize(
    attempt: &mut Attempt,
    now: chrono::DateTime<chrono::Utc>,
) -> (AggregateScores, Vec<Skill>) {
    let aggregate = scoring::aggregate(&attempt.answers);
    attempt.skill_scores = Some(Json(aggregate.per_skill.clone()));
    attempt.overall_score = Some(aggregate.overall);
    if attempt.completed_at.is_none() {
        attempt.completed_at = Some(now);
    }
    let weak = policy::weak_skills(&aggregate.per_skill, WEAK_SKILL_THRESHOLD);
    (aggregate, weak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn question(id: i64, skill: Skill, correct_index: i32) -> Question {
        let mut skill_weights = BTreeMap::new();
        skill_weights.insert(skill, 1.0);
        Question {
            id,
            content: format!("Question {}", id),
            difficulty: 3,
            options: Json(vec!["A".into(), "B".into(), "C".into()]),
            correct_index,
            skill_weights: Json(skill_weights),
            created_at: None,
        }
    }

    fn attempt(expected: Option<i32>) -> Attempt {
        Attempt {
            id: 1,
            learner_id: "learner-1".to_string(),
            started_at: chrono::Utc::now(),
            completed_at: None,
            expected_question_count: expected,
            placement_score: None,
            last_question_id: None,
            answers: Json(Vec::new()),
            skill_scores: None,
            overall_score: None,
        }
    }

    #[test]
    fn correct_answer_is_scored_and_snapshotted() {
        let mut a = attempt(None);
        let q = question(10, Skill::Listening, 1);

        let outcome = apply_answer(&mut a, &q, 1, chrono::Utc::now()).unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.answer_count, 1);
        assert!(!outcome.completed);
        assert_eq!(a.answers[0].difficulty, 3);
        assert_eq!(a.answers[0].primary_skill(), Skill::Listening);
        assert_eq!(outcome.aggregate.per_skill[&Skill::Listening], 100);
    }

    #[test]
    fn out_of_bounds_index_is_rejected_without_side_effects() {
        let mut a = attempt(None);
        let q = question(10, Skill::Listening, 1);

        let err = apply_answer(&mut a, &q, 7, chrono::Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(a.answer_count(), 0);
        assert!(a.skill_scores.is_none());
    }

    #[test]
    fn skip_sentinel_counts_as_incorrect() {
        let mut a = attempt(None);
        let q = question(10, Skill::Grasping, 0);

        let outcome = apply_answer(&mut a, &q, SKIP_SENTINEL, chrono::Utc::now()).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.answer_count, 1);
        assert_eq!(outcome.aggregate.per_skill[&Skill::Grasping], 0);
    }

    #[test]
    fn resubmission_replaces_and_rescoring_uses_latest_choice() {
        let mut a = attempt(None);
        let q = question(10, Skill::Retention, 2);

        apply_answer(&mut a, &q, 0, chrono::Utc::now()).unwrap();
        assert_eq!(a.overall_score, Some(0));

        let outcome = apply_answer(&mut a, &q, 2, chrono::Utc::now()).unwrap();
        assert_eq!(outcome.answer_count, 1);
        assert!(outcome.correct);
        assert_eq!(outcome.aggregate.per_skill[&Skill::Retention], 100);
    }

    #[test]
    fn third_distinct_answer_completes_when_expected_is_three() {
        let mut a = attempt(Some(3));
        let now = chrono::Utc::now();

        apply_answer(&mut a, &question(1, Skill::Listening, 0), 0, now).unwrap();
        apply_answer(&mut a, &question(2, Skill::Grasping, 0), 1, now).unwrap();
        assert!(!a.is_completed());

        let outcome = apply_answer(&mut a, &question(3, Skill::Retention, 0), 0, now).unwrap();
        assert!(outcome.completed);
        assert!(a.is_completed());
    }

    #[test]
    fn revision_does_not_count_toward_completion() {
        let mut a = attempt(Some(2));
        let now = chrono::Utc::now();
        let q = question(1, Skill::Listening, 0);

        apply_answer(&mut a, &q, 0, now).unwrap();
        let outcome = apply_answer(&mut a, &q, 1, now).unwrap();

        assert_eq!(outcome.answer_count, 1);
        assert!(!outcome.completed);
    }

    #[test]
    fn completed_attempt_rejects_further_answers_unchanged() {
        let mut a = attempt(Some(1));
        let now = chrono::Utc::now();
        apply_answer(&mut a, &question(1, Skill::Listening, 0), 0, now).unwrap();
        assert!(a.is_completed());

        let scores_before = a.skill_scores.clone();
        let err = apply_answer(&mut a, &question(2, Skill::Grasping, 0), 0, now).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(a.answer_count(), 1);
        assert_eq!(a.skill_scores, scores_before);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut a = attempt(None);
        let now = chrono::Utc::now();
        apply_answer(&mut a, &question(1, Skill::Listening, 0), 0, now).unwrap();

        let (first, weak_first) = finalize(&mut a, now);
        let completed_at = a.completed_at;
        let later = now + chrono::Duration::seconds(30);
        let (second, weak_second) = finalize(&mut a, later);

        assert_eq!(first, second);
        assert_eq!(weak_first, weak_second);
        assert_eq!(a.completed_at, completed_at);
    }

    #[test]
    fn finalize_reports_unassessed_skills_as_weak() {
        let mut a = attempt(None);
        let now = chrono::Utc::now();
        apply_answer(&mut a, &question(1, Skill::Listening, 0), 0, now).unwrap();

        let (aggregate, weak) = finalize(&mut a, now);
        assert_eq!(aggregate.per_skill[&Skill::Listening], 100);
        assert_eq!(
            weak,
            vec![Skill::Application, Skill::Grasping, Skill::Retention]
        );
    }
}
