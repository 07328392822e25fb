// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::collections::HashSet;
use validator::Validate;

use crate::{
    config::WEAK_SKILL_THRESHOLD,
    engine::{difficulty, policy, selector, submission},
    error::AppError,
    models::{
        attempt::{NextQuestionRequest, StartAttemptRequest, SubmitAnswerRequest},
        question::PublicQuestion,
    },
    store,
};

/// Starts a new diagnostic attempt for a learner.
///
/// The attempt begins Open with an empty answer collection. An optional
/// placement score seeds the starting difficulty for the first question.
pub async fn start_attempt(
    State(pool): State<PgPool>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let attempt = store::attempts::create(
        &pool,
        &payload.learner_id,
        payload.expected_question_count,
        payload.placement_score,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to create attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(
        "Started attempt {} for learner {}",
        attempt.id,
        attempt.learner_id
    );

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Read-side report for dashboards: state, progress and scores.
pub async fn get_attempt(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = store::attempts::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", id)))?;

    let weak_skills = attempt
        .skill_scores
        .as_ref()
        .filter(|_| attempt.is_completed())
        .map(|scores| policy::weak_skills(scores, WEAK_SKILL_THRESHOLD));

    Ok(Json(serde_json::json!({
        "id": attempt.id,
        "learner_id": attempt.learner_id,
        "started_at": attempt.started_at,
        "completed_at": attempt.completed_at,
        "completed": attempt.is_completed(),
        "answer_count": attempt.answer_count(),
        "expected_question_count": attempt.expected_question_count,
        "skill_scores": attempt.skill_scores,
        "overall_score": attempt.overall_score,
        "weak_skills": weak_skills,
    })))
}

/// Serves the next question for an attempt.
///
/// Runs the Difficulty Adjuster on whatever signal exists (mid-attempt step,
/// placement score, or cold start), then the Question Selector over a pool
/// one level either side of the target. Questions already answered, the last
/// served question and any client-supplied ids are excluded. An exhausted
/// pool is a normal response with a null question, not an error.
pub async fn next_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<NextQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = store::attempts::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", id)))?;

    if attempt.is_completed() {
        return Err(AppError::Conflict(format!(
            "Attempt {} is already completed",
            id
        )));
    }

    let adaptive = payload.prior_difficulty.is_some() && payload.was_correct.is_some();
    let target = difficulty::next_difficulty(
        payload.prior_difficulty,
        payload.was_correct,
        attempt.placement_score,
    );

    let candidates = store::questions::candidate_pool(&pool, target).await?;

    let mut excluded: HashSet<i64> = attempt.answered_ids();
    excluded.extend(payload.excluded_ids.iter().copied());
    if let Some(last) = attempt.last_question_id {
        excluded.insert(last);
    }

    let picked = {
        let mut rng = rand::thread_rng();
        selector::select_question(&candidates, target, &excluded, adaptive, &mut rng)
    };

    match picked {
        Some(question) => {
            store::attempts::record_served(&pool, id, question.id).await?;
            tracing::debug!(
                "Attempt {}: serving question {} at target difficulty {}",
                id,
                question.id,
                target
            );
            Ok(Json(serde_json::json!({
                "question": PublicQuestion::from(question),
                "target_difficulty": target,
            })))
        }
        None => {
            tracing::info!(
                "Attempt {}: question pool exhausted at target difficulty {}",
                id,
                target
            );
            Ok(Json(serde_json::json!({
                "question": null,
                "target_difficulty": target,
            })))
        }
    }
}

/// Submits one answer.
///
/// The whole load -> check -> merge -> rescore -> write sequence runs inside
/// a single transaction with the attempt row locked, so concurrent
/// submissions for the same attempt serialize and partial interleavings are
/// never observable.
pub async fn submit_answer(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut attempt = store::attempts::lock_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", id)))?;

    let question = store::questions::find_by_id(&pool, payload.question_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Question {} not found", payload.question_id))
        })?;

    // Any error below drops `tx` and rolls the transaction back wholesale.
    let outcome = submission::apply_answer(
        &mut attempt,
        &question,
        payload.chosen_index,
        chrono::Utc::now(),
    )?;

    store::attempts::persist(&mut tx, &attempt).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "correct": outcome.correct,
        "aggregate": outcome.aggregate,
        "answer_count": outcome.answer_count,
        "completed": outcome.completed,
    })))
}

/// Forces completion of an attempt and returns the final report.
///
/// Idempotent: completing an already-completed attempt re-derives the same
/// scores and keeps the original completion timestamp.
pub async fn complete_attempt(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let mut attempt = store::attempts::lock_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", id)))?;

    let (aggregate, weak_skills) = submission::finalize(&mut attempt, chrono::Utc::now());

    store::attempts::persist(&mut tx, &attempt).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(
        "Attempt {} completed: overall {}, weak skills {:?}",
        id,
        aggregate.overall,
        weak_skills
    );

    Ok(Json(serde_json::json!({
        "skill_scores": aggregate.per_skill,
        "overall_score": aggregate.overall,
        "weak_skills": weak_skills,
        "completed_at": attempt.completed_at,
    })))
}
