// src/handlers/question.rs
//
// Content-management surface for the question bank. The diagnostic core
// treats questions as read-only; these handlers are how content gets there.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    config::{MAX_LEVEL, MIN_LEVEL},
    error::AppError,
    models::question::{CreateQuestionRequest, UpdateQuestionRequest},
    store,
};

/// Creates a new question.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if !payload.correct_index_in_bounds() {
        return Err(AppError::BadRequest(format!(
            "correct_index {} is out of bounds for {} options",
            payload.correct_index,
            payload.options.len()
        )));
    }

    let question = store::questions::insert(
        &pool,
        &payload.content,
        payload.difficulty,
        &payload.options,
        payload.correct_index,
        &payload.skill_weights,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Updates a question. Fields are optional; the merged result must still
/// satisfy the question invariants.
pub async fn update_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut question = store::questions::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

    if let Some(content) = payload.content {
        question.content = content;
    }
    if let Some(difficulty) = payload.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(options) = payload.options {
        question.options = SqlJson(options);
    }
    if let Some(correct_index) = payload.correct_index {
        question.correct_index = correct_index;
    }
    if let Some(skill_weights) = payload.skill_weights {
        question.skill_weights = SqlJson(skill_weights);
    }

    if !(MIN_LEVEL..=MAX_LEVEL).contains(&question.difficulty) {
        return Err(AppError::BadRequest(format!(
            "difficulty must be between {} and {}",
            MIN_LEVEL, MAX_LEVEL
        )));
    }
    if question.options.is_empty() {
        return Err(AppError::BadRequest("options cannot be empty".to_string()));
    }
    if question.correct_index < 0 || question.correct_index as usize >= question.options.len() {
        return Err(AppError::BadRequest(format!(
            "correct_index {} is out of bounds for {} options",
            question.correct_index,
            question.options.len()
        )));
    }

    store::questions::update(&pool, &question).await.map_err(|e| {
        tracing::error!("Failed to update question {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(question))
}

/// Deletes a question.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = store::questions::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete question {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    if !deleted {
        return Err(AppError::NotFound(format!("Question {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
