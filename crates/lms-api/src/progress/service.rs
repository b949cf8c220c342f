//! Lesson completion and course progress bookkeeping.

use lms_core::{ProgressStatus, progress};
use lms_db::repositories::{course as course_repo, progress as progress_repo};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Progress after a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// The lesson had been completed before; nothing changed.
    pub already_completed: bool,
    pub completed_lessons_count: i32,
    pub total_lessons: i32,
    pub progress: i32,
    pub is_completed: bool,
    /// This request moved the course to COMPLETED.
    #[serde(skip)]
    pub course_newly_completed: bool,
}

impl Completion {
    fn new(count: i32, total: i32, status: ProgressStatus, already_completed: bool) -> Self {
        Self {
            already_completed,
            completed_lessons_count: count,
            total_lessons: total,
            progress: progress::percent(count, total),
            is_completed: status == ProgressStatus::Completed,
            course_newly_completed: false,
        }
    }
}

/// The course's cached lesson count, filled from a live count when unset.
pub async fn ensure_total_lessons(conn: &mut PgConnection, course_id: Uuid) -> Result<i32, sqlx::Error> {
    let cached = course_repo::total_lessons(&mut *conn, course_id).await?.unwrap_or(0);
    if cached > 0 {
        return Ok(cached);
    }

    let counted = course_repo::count_lessons(&mut *conn, course_id).await? as i32;
    if counted > 0 {
        course_repo::set_total_lessons(&mut *conn, course_id, counted).await?;
        tracing::debug!(%course_id, total = counted, "backfilled total_lessons");
    }
    Ok(counted)
}

/// Recount the course's lessons and store the count if the cached one differs.
pub async fn refresh_total_lessons(conn: &mut PgConnection, course_id: Uuid) -> Result<i32, sqlx::Error> {
    let cached = course_repo::total_lessons(&mut *conn, course_id).await?.unwrap_or(0);
    let counted = course_repo::count_lessons(&mut *conn, course_id).await? as i32;
    if counted != cached {
        course_repo::set_total_lessons(&mut *conn, course_id, counted).await?;
        tracing::debug!(%course_id, cached, total = counted, "refreshed stale total_lessons");
    }
    Ok(counted)
}

async fn current_state(pool: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<Completion, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let total = ensure_total_lessons(&mut conn, course_id).await?;
    let row = progress_repo::find_progress(&mut *conn, user_id, course_id).await?;

    Ok(match row {
        Some(row) => Completion::new(row.completed_lessons_count, total, row.status, true),
        None => Completion::new(0, total, ProgressStatus::InProgress, true),
    })
}

/// Mark `lesson_id` completed for `user_id` and advance their course progress.
///
/// Returns `None` if the lesson does not exist. Repeating the call for the
/// same lesson changes nothing and reports `already_completed`. The
/// completion record, the counter increment, the lesson count backfill and
/// the status change commit together or not at all. The progress row stays
/// locked from the increment until commit, so concurrent completions by the
/// same user in the same course are serialized.
pub async fn complete_lesson(
    pool: &PgPool,
    user_id: Uuid,
    lesson_id: Uuid,
    time_spent: Option<i32>,
) -> Result<Option<Completion>, sqlx::Error> {
    let Some(course_id) = progress_repo::find_lesson_course(pool, lesson_id).await? else {
        return Ok(None);
    };

    if progress_repo::completion_exists(pool, user_id, lesson_id).await? {
        return current_state(pool, user_id, course_id).await.map(Some);
    }

    let mut tx = pool.begin().await?;

    if !progress_repo::insert_completion(&mut *tx, user_id, lesson_id, course_id, time_spent).await? {
        // A concurrent request recorded it first.
        tx.rollback().await?;
        return current_state(pool, user_id, course_id).await.map(Some);
    }

    let mut row = progress_repo::increment_progress(&mut *tx, user_id, course_id).await?;
    let total = ensure_total_lessons(&mut tx, course_id).await?;

    let mut newly_completed = false;
    if progress::is_complete(row.completed_lessons_count, total) && row.status != ProgressStatus::Completed {
        row = progress_repo::mark_completed(&mut *tx, row.id).await?;
        newly_completed = true;
    }

    tx.commit().await?;

    let mut completion = Completion::new(row.completed_lessons_count, total, row.status, false);
    completion.course_newly_completed = newly_completed;
    Ok(Some(completion))
}
