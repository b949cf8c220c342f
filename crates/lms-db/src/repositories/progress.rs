// Course progress and the lesson completion log.
//
// The counter is only ever changed with single-statement upserts so two
// completions racing on the same (user, course) row serialize on the row
// lock instead of losing an increment.

use lms_core::ProgressStatus;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{CourseProgress, CourseWithProgress};

/// Course that owns the lesson, or `None` if the lesson does not exist.
pub async fn find_lesson_course<'e, E>(executor: E, lesson_id: Uuid) -> Result<Option<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT s.course_id
            FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE l.id = $1
        "#,
    )
    .bind(lesson_id)
    .fetch_optional(executor)
    .await
}

pub async fn completion_exists<'e, E>(executor: E, user_id: Uuid, lesson_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(
                SELECT 1 FROM completed_lessons
                WHERE user_id = $1 AND lesson_id = $2
            )
        "#,
    )
    .bind(user_id)
    .bind(lesson_id)
    .fetch_one(executor)
    .await
}

/// Record a completion; a missing `time_spent` is stored as 0. Returns
/// `false` when the lesson was already recorded for this user (a concurrent
/// duplicate lost the race).
pub async fn insert_completion<'e, E>(
    executor: E,
    user_id: Uuid,
    lesson_id: Uuid,
    course_id: Uuid,
    time_spent: Option<i32>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO completed_lessons (user_id, lesson_id, course_id, time_spent)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, lesson_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(lesson_id)
    .bind(course_id)
    .bind(time_spent.unwrap_or(0))
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Create the progress row with a count of 1, or add one to the existing count.
pub async fn increment_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<CourseProgress, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO user_course_progress (user_id, course_id, status, completed_lessons_count)
            VALUES ($1, $2, 'IN_PROGRESS', 1)
            ON CONFLICT (user_id, course_id)
            DO UPDATE SET
                completed_lessons_count = user_course_progress.completed_lessons_count + 1,
                last_access_at = NOW()
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

/// Flip a progress row to COMPLETED, stamping `completed_at` with the current time.
pub async fn mark_completed<'e, E>(executor: E, progress_id: Uuid) -> Result<CourseProgress, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE user_course_progress
            SET status = $2,
                completed_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(progress_id)
    .bind(ProgressStatus::Completed.as_str())
    .fetch_one(executor)
    .await
}

/// Start (or re-enter) a course.
///
/// A new row starts IN_PROGRESS with a count of 0. An existing row gets a
/// fresh `last_access_at` and is moved back to IN_PROGRESS; its counter and
/// `completed_at` are kept.
pub async fn start_course<'e, E>(executor: E, user_id: Uuid, course_id: Uuid) -> Result<CourseProgress, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO user_course_progress (user_id, course_id, status, completed_lessons_count)
            VALUES ($1, $2, 'IN_PROGRESS', 0)
            ON CONFLICT (user_id, course_id)
            DO UPDATE SET
                status = 'IN_PROGRESS',
                last_access_at = NOW()
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(executor)
    .await
}

pub async fn find_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Option<CourseProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM user_course_progress
            WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub async fn completed_lesson_ids<'e, E>(
    executor: E,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT lesson_id FROM completed_lessons
            WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(executor)
    .await
}

/// The user's courses in the given status, most recent activity first.
pub async fn list_by_status<'e, E>(
    executor: E,
    user_id: Uuid,
    status: ProgressStatus,
) -> Result<Vec<CourseWithProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT c.*, p.status, p.completed_lessons_count, p.last_access_at, p.completed_at
            FROM user_course_progress p
            JOIN courses c ON c.id = p.course_id
            WHERE p.user_id = $1 AND p.status = $2
            ORDER BY CASE WHEN p.status = 'COMPLETED' THEN p.completed_at ELSE p.last_access_at END DESC
        "#,
    )
    .bind(user_id)
    .bind(status.as_str())
    .fetch_all(executor)
    .await
}

/// Forget every user's progress on a course. Used when its lessons are replaced.
pub async fn reset_course<'e, E>(executor: E, course_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    // completed_lessons rows go with the lessons via ON DELETE CASCADE
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM user_course_progress WHERE course_id = $1
        "#,
    )
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
