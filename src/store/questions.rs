// src/store/questions.rs

use sqlx::PgPool;
use sqlx::types::Json;
use std::collections::BTreeMap;

use crate::config::{MAX_LEVEL, MIN_LEVEL};
use crate::models::question::Question;
use crate::models::skill::Skill;

const QUESTION_COLUMNS: &str =
    "id, content, difficulty, options, correct_index, skill_weights, created_at";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions WHERE id = $1",
        QUESTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Fetches the candidate pool for a target difficulty: the exact level plus
/// one level either side (clamped), so a thin exact pool cannot starve the
/// selector.
pub async fn candidate_pool(pool: &PgPool, target: i16) -> Result<Vec<Question>, sqlx::Error> {
    let low = (target - 1).max(MIN_LEVEL);
    let high = (target + 1).min(MAX_LEVEL);

    sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions WHERE difficulty BETWEEN $1 AND $2 ORDER BY id",
        QUESTION_COLUMNS
    ))
    .bind(low)
    .bind(high)
    .fetch_all(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    content: &str,
    difficulty: i16,
    options: &[String],
    correct_index: i32,
    skill_weights: &BTreeMap<Skill, f64>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (content, difficulty, options, correct_index, skill_weights)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        QUESTION_COLUMNS
    ))
    .bind(content)
    .bind(difficulty)
    .bind(Json(options))
    .bind(correct_index)
    .bind(Json(skill_weights))
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, question: &Question) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE questions
         SET content = $1, difficulty = $2, options = $3, correct_index = $4, skill_weights = $5
         WHERE id = $6",
    )
    .bind(&question.content)
    .bind(question.difficulty)
    .bind(&question.options)
    .bind(question.correct_index)
    .bind(&question.skill_weights)
    .bind(question.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns whether a row was actually deleted.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
