// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use std::collections::{BTreeMap, HashSet};
use validator::Validate;

use crate::models::skill::Skill;

/// One submitted response within an attempt.
///
/// Difficulty and skill weights are snapshotted from the question at
/// submission time; correctness is computed once and never re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: i64,

    /// Chosen option index, or `SKIP_SENTINEL` for a timed-out/skipped
    /// question.
    pub chosen_index: i32,

    pub correct: bool,

    pub difficulty: i16,

    pub skill_weights: BTreeMap<Skill, f64>,
}

impl AnswerRecord {
    pub fn primary_skill(&self) -> Skill {
        Skill::primary(&self.skill_weights)
    }
}

/// Represents the 'attempts' table in the database.
/// One diagnostic session for one learner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,

    pub learner_id: String,

    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Set exactly once; a completed attempt accepts no further answers.
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,

    /// When set, the attempt auto-completes on reaching this many distinct
    /// answers.
    pub expected_question_count: Option<i32>,

    /// Placement score from a prior diagnostic, used to pick the starting
    /// difficulty.
    pub placement_score: Option<i64>,

    /// Last question served to the client, to detect desync and avoid
    /// serving the same question twice in a row.
    pub last_question_id: Option<i64>,

    /// Answer records in arrival order, unique by question id.
    pub answers: Json<Vec<AnswerRecord>>,

    /// Per-skill percentages, recomputed on every submission and at
    /// completion.
    pub skill_scores: Option<Json<BTreeMap<Skill, i64>>>,

    pub overall_score: Option<i64>,
}

impl Attempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Number of distinct questions answered (resubmission does not grow
    /// this).
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Question ids already answered in this attempt.
    pub fn answered_ids(&self) -> HashSet<i64> {
        self.answers.iter().map(|a| a.question_id).collect()
    }

    /// Inserts the record, or replaces the existing record for the same
    /// question id in place (answer revision keeps the arrival position).
    pub fn merge_answer(&mut self, record: AnswerRecord) {
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == record.question_id)
        {
            Some(existing) => *existing = record,
            None => self.answers.push(record),
        }
    }
}

/// DTO for starting a diagnostic attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1, max = 64))]
    pub learner_id: String,

    #[validate(range(min = 1, max = 100))]
    pub expected_question_count: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub placement_score: Option<i64>,
}

/// DTO for requesting the next question of an attempt.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuestionRequest {
    /// Difficulty of the question the client just showed, if any.
    pub prior_difficulty: Option<i16>,

    /// Whether that question was answered correctly.
    pub was_correct: Option<bool>,

    /// Extra ids the client wants excluded, merged with the server-side
    /// seen set.
    #[serde(default)]
    pub excluded_ids: Vec<i64>,
}

/// DTO for submitting an answer.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: i64,
    pub chosen_index: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt() -> Attempt {
        Attempt {
            id: 1,
            learner_id: "learner-1".to_string(),
            started_at: chrono::Utc::now(),
            completed_at: None,
            expected_question_count: None,
            placement_score: None,
            last_question_id: None,
            answers: Json(Vec::new()),
            skill_scores: None,
            overall_score: None,
        }
    }

    fn record(question_id: i64, chosen_index: i32) -> AnswerRecord {
        AnswerRecord {
            question_id,
            chosen_index,
            correct: false,
            difficulty: 3,
            skill_weights: BTreeMap::new(),
        }
    }

    #[test]
    fn merge_inserts_new_answers_in_arrival_order() {
        let mut a = attempt();
        a.merge_answer(record(10, 0));
        a.merge_answer(record(20, 1));

        assert_eq!(a.answer_count(), 2);
        assert_eq!(a.answers[0].question_id, 10);
        assert_eq!(a.answers[1].question_id, 20);
    }

    #[test]
    fn merge_replaces_existing_answer_keeping_position() {
        let mut a = attempt();
        a.merge_answer(record(10, 0));
        a.merge_answer(record(20, 1));
        a.merge_answer(record(10, 2));

        assert_eq!(a.answer_count(), 2);
        assert_eq!(a.answers[0].question_id, 10);
        assert_eq!(a.answers[0].chosen_index, 2);
    }
}
