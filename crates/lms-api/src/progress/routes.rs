use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use lms_core::ProgressStatus;
use lms_db::{
    models::Course,
    repositories::{course as course_repo, progress as progress_repo},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::service;
use crate::{
    ApiState,
    auth::AuthUser,
    course::model::{CourseProgressItem, ProgressSummary},
    error::ApiError,
    lang::RequestLang,
    metrics::{CompletionOutcome, record_course_completion, record_lesson_completion},
};

/// Create the learner progress routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/lessons/complete", post(complete_lesson))
        .route("/courses/available", get(list_available))
        .route("/courses/progress", get(list_in_progress))
        .route("/courses/completed", get(list_completed))
        .route("/courses/start", post(start_course))
}

#[derive(Debug, Deserialize)]
struct CompleteLessonRequest {
    lesson_id: Option<Uuid>,
    time_spent: Option<i32>,
}

async fn complete_lesson(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
    Json(request): Json<CompleteLessonRequest>,
) -> Result<Json<Value>, ApiError> {
    let m = lang.messages();
    let lesson_id = request
        .lesson_id
        .ok_or_else(|| ApiError::Validation(m.lesson_id_required.to_string()))?;

    let result = service::complete_lesson(&state.pool, auth_user.user_id, lesson_id, request.time_spent).await;
    let completion = match result {
        Ok(Some(completion)) => completion,
        Ok(None) => return Err(ApiError::NotFound(m.lesson_not_found.to_string())),
        Err(e) => {
            tracing::error!(error = %e, user_id = %auth_user.user_id, %lesson_id, "lesson completion failed");
            record_lesson_completion(CompletionOutcome::Failed);
            return Err(ApiError::Transaction(m.course_progress_error.to_string()));
        }
    };

    if completion.already_completed {
        record_lesson_completion(CompletionOutcome::AlreadyCompleted);
        return Ok(Json(json!({
            "ok": true,
            "message": m.lesson_already_completed,
            "already_completed": true,
            "progress": completion.progress,
            "completed_lessons_count": completion.completed_lessons_count,
            "total_lessons": completion.total_lessons,
            "is_completed": completion.is_completed,
        })));
    }

    record_lesson_completion(CompletionOutcome::Recorded);
    if completion.course_newly_completed {
        record_course_completion();
        tracing::info!(user_id = %auth_user.user_id, %lesson_id, "course completed");
    }

    Ok(Json(json!({
        "ok": true,
        "message": m.lesson_completed,
        "progress": completion.progress,
        "completed_lessons_count": completion.completed_lessons_count,
        "total_lessons": completion.total_lessons,
        "is_completed": completion.is_completed,
    })))
}

/// Courses the caller has not started yet.
async fn list_available(auth_user: AuthUser, State(state): State<ApiState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(course_repo::list_available(&state.pool, auth_user.user_id).await?))
}

async fn list_by_status(state: &ApiState, user_id: Uuid, status: ProgressStatus) -> Result<Vec<CourseProgressItem>, ApiError> {
    let rows = progress_repo::list_by_status(&state.pool, user_id, status).await?;
    Ok(rows.into_iter().map(CourseProgressItem::from).collect())
}

async fn list_in_progress(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<CourseProgressItem>>, ApiError> {
    Ok(Json(list_by_status(&state, auth_user.user_id, ProgressStatus::InProgress).await?))
}

async fn list_completed(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<CourseProgressItem>>, ApiError> {
    Ok(Json(list_by_status(&state, auth_user.user_id, ProgressStatus::Completed).await?))
}

#[derive(Debug, Deserialize)]
struct StartCourseRequest {
    course_id: Uuid,
}

/// Start or resume a course. A completed course goes back to IN_PROGRESS;
/// already completed lessons keep counting. A stale cached lesson count is
/// corrected from the live count.
async fn start_course(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
    Json(request): Json<StartCourseRequest>,
) -> Result<Json<ProgressSummary>, ApiError> {
    let course_id = request.course_id;
    if course_repo::find_course(&state.pool, course_id).await?.is_none() {
        return Err(ApiError::NotFound(lang.messages().course_not_found.to_string()));
    }

    let mut tx = state.pool.begin().await?;
    let total = service::refresh_total_lessons(&mut tx, course_id).await?;
    let row = progress_repo::start_course(&mut *tx, auth_user.user_id, course_id).await?;
    tx.commit().await?;

    tracing::debug!(user_id = %auth_user.user_id, %course_id, "course started");
    Ok(Json(ProgressSummary::new(&row, total)))
}
