// src/store/attempts.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::attempt::Attempt;

const ATTEMPT_COLUMNS: &str = "id, learner_id, started_at, completed_at, expected_question_count, \
     placement_score, last_question_id, answers, skill_scores, overall_score";

pub async fn create(
    pool: &PgPool,
    learner_id: &str,
    expected_question_count: Option<i32>,
    placement_score: Option<i64>,
) -> Result<Attempt, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (learner_id, expected_question_count, placement_score)
         VALUES ($1, $2, $3)
         RETURNING {}",
        ATTEMPT_COLUMNS
    ))
    .bind(learner_id)
    .bind(expected_question_count)
    .bind(placement_score)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {} FROM attempts WHERE id = $1",
        ATTEMPT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Loads an attempt with a row lock, serializing concurrent submissions for
/// the same attempt. Must run inside a transaction; the lock is held until
/// commit or rollback.
pub async fn lock_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {} FROM attempts WHERE id = $1 FOR UPDATE",
        ATTEMPT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

/// Writes back the mutable portion of an attempt inside the caller's
/// transaction.
pub async fn persist(
    tx: &mut Transaction<'_, Postgres>,
    attempt: &Attempt,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE attempts
         SET completed_at = $1, last_question_id = $2, answers = $3,
             skill_scores = $4, overall_score = $5
         WHERE id = $6",
    )
    .bind(attempt.completed_at)
    .bind(attempt.last_question_id)
    .bind(&attempt.answers)
    .bind(&attempt.skill_scores)
    .bind(attempt.overall_score)
    .bind(attempt.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Records the id of the question just served, for desync detection and
/// repeat avoidance.
pub async fn record_served(
    pool: &PgPool,
    attempt_id: i64,
    question_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE attempts SET last_question_id = $1 WHERE id = $2")
        .bind(question_id)
        .bind(attempt_id)
        .execute(pool)
        .await?;
    Ok(())
}
