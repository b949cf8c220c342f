use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use lms_core::payload::{CoursePayload, SavedEntity, SlugCheck};
use lms_db::repositories::{course as course_repo, progress as progress_repo};
use serde_json::json;
use uuid::Uuid;

use super::{
    model::{CourseDetail, ProgressSummary},
    service,
};
use crate::{
    ApiState,
    auth::{AuthUser, Role},
    entity::{conflict_on_unique, derive_slug, only_check_slug, stale_urls},
    error::ApiError,
    lang::RequestLang,
    storage::delete_urls,
    validation,
};

/// Create the course authoring and detail routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/courses/control", get(list_control).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}

async fn load_detail(
    state: &ApiState,
    course: lms_db::models::Course,
    user: Option<&AuthUser>,
) -> Result<CourseDetail, ApiError> {
    let sections = course_repo::list_sections(&state.pool, course.id).await?;
    let lessons = course_repo::list_lessons(&state.pool, course.id).await?;

    let Some(user) = user else {
        return Ok(CourseDetail::assemble(course, sections, lessons, None, None));
    };
    let completed = progress_repo::completed_lesson_ids(&state.pool, user.user_id, course.id).await?;
    let progress = progress_repo::find_progress(&state.pool, user.user_id, course.id)
        .await?
        .map(|row| ProgressSummary::new(&row, course.total_lessons));

    Ok(CourseDetail::assemble(
        course,
        sections,
        lessons,
        Some(&completed),
        progress,
    ))
}

/// Courses the caller may edit: all of them for ROOT, their own for MEDIC.
async fn list_control(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
) -> Result<Json<Vec<CourseDetail>>, ApiError> {
    auth_user.require_role(Role::AUTHORS, lang)?;

    let author = (!auth_user.is_root()).then_some(auth_user.user_id);
    let courses = course_repo::list_courses(&state.pool, author).await?;

    let mut details = Vec::with_capacity(courses.len());
    for course in courses {
        details.push(load_detail(&state, course, None).await?);
    }
    Ok(Json(details))
}

async fn create_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(payload): Json<CoursePayload>,
) -> Result<Response, ApiError> {
    let lang = RequestLang(payload.lang);
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let slug = derive_slug(&payload.title, m.course_title_required)?;
    if course_repo::slug_taken(&state.pool, &slug, None).await? {
        return Err(ApiError::Conflict(m.course_already_exists.to_string()));
    }
    if only_check_slug(&headers) {
        return Ok(Json(SlugCheck { ok: true }).into_response());
    }

    validation::validate_course(&payload, m)?;
    let keywords = validation::validate_keywords(&payload.keywords, m)?;

    let course = service::create(&state.pool, &payload, &slug, &keywords, auth_user.user_id)
        .await
        .map_err(|e| conflict_on_unique(e, m.course_already_exists))?;

    tracing::info!(course_id = %course.id, slug = %course.slug, author_id = %auth_user.user_id, "course created");
    let saved = SavedEntity {
        id: course.id,
        slug: course.slug,
        version: course.version,
    };
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

async fn get_course(
    auth_user: Option<AuthUser>,
    lang: RequestLang,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDetail>, ApiError> {
    let course = course_repo::find_course(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(lang.messages().course_not_found.to_string()))?;

    Ok(Json(load_detail(&state, course, auth_user.as_ref()).await?))
}

async fn update_course(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CoursePayload>,
) -> Result<Response, ApiError> {
    let lang = RequestLang(payload.lang);
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let slug = derive_slug(&payload.title, m.course_title_required)?;
    if course_repo::slug_taken(&state.pool, &slug, Some(id)).await? {
        return Err(ApiError::Conflict(m.course_already_exists.to_string()));
    }
    if only_check_slug(&headers) {
        return Ok(Json(SlugCheck { ok: true }).into_response());
    }

    let current = course_repo::find_course(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(m.course_not_found.to_string()))?;
    auth_user.require_owner(current.author_id, lang)?;

    validation::validate_course(&payload, m)?;
    let keywords = validation::validate_keywords(&payload.keywords, m)?;

    let mut previous_files = course_repo::lesson_file_urls(&state.pool, id).await?;
    previous_files.extend(current.image_url);

    let course = service::replace(&state.pool, id, &payload, &slug, &keywords)
        .await
        .map_err(|e| conflict_on_unique(e, m.course_already_exists))?
        .ok_or_else(|| ApiError::NotFound(m.course_not_found.to_string()))?;

    let stale = stale_urls(previous_files, service::referenced_urls(&payload));
    delete_urls(state.storage.as_ref(), stale).await;

    tracing::info!(course_id = %course.id, version = course.version, "course updated");
    Ok(Json(SavedEntity {
        id: course.id,
        slug: course.slug,
        version: course.version,
    })
    .into_response())
}

async fn delete_course(
    auth_user: AuthUser,
    lang: RequestLang,
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let m = lang.messages();
    auth_user.require_role(Role::AUTHORS, lang)?;

    let course = course_repo::find_course(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(m.course_not_found.to_string()))?;
    auth_user.require_owner(course.author_id, lang)?;

    let mut files = course_repo::lesson_file_urls(&state.pool, id).await?;
    files.extend(course.image_url);

    if !course_repo::delete_course(&state.pool, id).await? {
        return Err(ApiError::NotFound(m.course_not_found.to_string()));
    }
    delete_urls(state.storage.as_ref(), files).await;

    tracing::info!(course_id = %id, "course deleted");
    Ok(Json(json!({ "ok": true })))
}
