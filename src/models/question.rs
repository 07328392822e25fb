// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::skill::Skill;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub content: String,

    /// Ordinal difficulty level, within [MIN_LEVEL, MAX_LEVEL].
    pub difficulty: i16,

    /// List of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Index of the correct option within `options`.
    pub correct_index: i32,

    /// Weighted mapping from skill to a positive weight. May be partial;
    /// the dominant skill classifies the question for aggregation.
    pub skill_weights: Json<BTreeMap<Skill, f64>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Question {
    /// The skill with the highest weight (fixed tie-break order).
    pub fn primary_skill(&self) -> Skill {
        Skill::primary(&self.skill_weights)
    }
}

/// DTO for serving a question to a learner (excludes the answer key and
/// the skill weights).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub content: String,
    pub difficulty: i16,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            content: q.content,
            difficulty: q.difficulty,
            options: q.options.0,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[validate(range(min = 1, max = 5))]
    pub difficulty: i16,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_index: i32,
    #[validate(custom(function = validate_skill_weights))]
    pub skill_weights: BTreeMap<Skill, f64>,
}

impl CreateQuestionRequest {
    /// Cross-field check that validator derive cannot express: the correct
    /// index must point into the options list.
    pub fn correct_index_in_bounds(&self) -> bool {
        self.correct_index >= 0 && (self.correct_index as usize) < self.options.len()
    }
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub content: Option<String>,
    pub difficulty: Option<i16>,
    pub options: Option<Vec<String>>,
    pub correct_index: Option<i32>,
    pub skill_weights: Option<BTreeMap<Skill, f64>>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

fn validate_skill_weights(
    weights: &BTreeMap<Skill, f64>,
) -> Result<(), validator::ValidationError> {
    for weight in weights.values() {
        if !weight.is_finite() || *weight <= 0.0 {
            return Err(validator::ValidationError::new("weight_must_be_positive"));
        }
    }
    Ok(())
}
