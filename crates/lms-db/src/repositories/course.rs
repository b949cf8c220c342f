use lms_core::payload::{LessonPayload, SectionPayload};
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{Course, Lesson, Section};

/// Column values written on create and update.
#[derive(Debug, Clone)]
pub struct CourseFields<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub image_url: Option<&'a str>,
    pub keywords: &'a [String],
    pub total_lessons: i32,
}

/// Whether `slug` is used by any course other than `except`.
pub async fn slug_taken<'e, E>(executor: E, slug: &str, except: Option<Uuid>) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(
                SELECT 1 FROM courses
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
        "#,
    )
    .bind(slug)
    .bind(except)
    .fetch_one(executor)
    .await
}

pub async fn insert_course<'e, E>(
    executor: E,
    fields: &CourseFields<'_>,
    author_id: Uuid,
) -> Result<Course, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO courses (title, slug, description, image_url, keywords, total_lessons, author_id, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1)
            RETURNING *
        "#,
    )
    .bind(fields.title)
    .bind(fields.slug)
    .bind(fields.description)
    .bind(fields.image_url)
    .bind(fields.keywords)
    .bind(fields.total_lessons)
    .bind(author_id)
    .fetch_one(executor)
    .await
}

/// Overwrite the course header and bump its version by one.
pub async fn update_course<'e, E>(
    executor: E,
    id: Uuid,
    fields: &CourseFields<'_>,
) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE courses
            SET title = $2,
                slug = $3,
                description = $4,
                image_url = $5,
                keywords = $6,
                total_lessons = $7,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(fields.title)
    .bind(fields.slug)
    .bind(fields.description)
    .bind(fields.image_url)
    .bind(fields.keywords)
    .bind(fields.total_lessons)
    .fetch_optional(executor)
    .await
}

pub async fn find_course<'e, E>(executor: E, id: Uuid) -> Result<Option<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM courses WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Courses newest first, optionally restricted to one author.
pub async fn list_courses<'e, E>(executor: E, author_id: Option<Uuid>) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM courses
            WHERE $1::uuid IS NULL OR author_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(executor)
    .await
}

/// Courses the user has not started yet.
pub async fn list_available<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Course>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT c.* FROM courses c
            WHERE NOT EXISTS (
                SELECT 1 FROM user_course_progress p
                WHERE p.course_id = c.id AND p.user_id = $1
            )
            ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn delete_course<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM courses WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop every section (and, by cascade, lesson) of a course.
pub async fn delete_sections<'e, E>(executor: E, course_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM sections WHERE course_id = $1
        "#,
    )
    .bind(course_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_section<'e, E>(
    executor: E,
    course_id: Uuid,
    section: &SectionPayload,
    position: i32,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO sections (course_id, title, position)
            VALUES ($1, $2, $3)
            RETURNING id
        "#,
    )
    .bind(course_id)
    .bind(section.title.trim())
    .bind(position)
    .fetch_one(executor)
    .await
}

/// Insert a lesson. URLs and the quiz are only stored for the lesson type
/// they belong to.
pub async fn insert_lesson<'e, E>(
    executor: E,
    section_id: Uuid,
    lesson: &LessonPayload,
    position: i32,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    use lms_core::LessonType;

    let video_url = match lesson.lesson_type {
        LessonType::Video => lesson.video_url.as_deref(),
        _ => None,
    };
    let document_url = match lesson.lesson_type {
        LessonType::Document => lesson.document_url.as_deref(),
        _ => None,
    };
    let test = match lesson.lesson_type {
        LessonType::Test => lesson.test.as_ref().map(Json),
        _ => None,
    };

    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO lessons (section_id, title, lesson_type, content, video_url, document_url, test, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
        "#,
    )
    .bind(section_id)
    .bind(lesson.title.trim())
    .bind(lesson.lesson_type.as_str())
    .bind(&lesson.content)
    .bind(video_url)
    .bind(document_url)
    .bind(test)
    .bind(position)
    .fetch_one(executor)
    .await
}

pub async fn list_sections<'e, E>(executor: E, course_id: Uuid) -> Result<Vec<Section>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT * FROM sections
            WHERE course_id = $1
            ORDER BY position
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

/// All lessons of a course in reading order.
pub async fn list_lessons<'e, E>(executor: E, course_id: Uuid) -> Result<Vec<Lesson>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT l.* FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE s.course_id = $1
            ORDER BY s.position, l.position
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

/// Storage URLs referenced by the course's lessons.
pub async fn lesson_file_urls<'e, E>(executor: E, course_id: Uuid) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT url FROM (
                SELECT l.video_url AS url FROM lessons l
                JOIN sections s ON s.id = l.section_id
                WHERE s.course_id = $1
                UNION
                SELECT l.document_url AS url FROM lessons l
                JOIN sections s ON s.id = l.section_id
                WHERE s.course_id = $1
            ) urls
            WHERE url IS NOT NULL
        "#,
    )
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub async fn count_lessons<'e, E>(executor: E, course_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM lessons l
            JOIN sections s ON s.id = l.section_id
            WHERE s.course_id = $1
        "#,
    )
    .bind(course_id)
    .fetch_one(executor)
    .await
}

/// Returns `None` when the course does not exist.
pub async fn total_lessons<'e, E>(executor: E, course_id: Uuid) -> Result<Option<i32>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT total_lessons FROM courses WHERE id = $1
        "#,
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub async fn set_total_lessons<'e, E>(executor: E, course_id: Uuid, total: i32) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE courses SET total_lessons = $2 WHERE id = $1
        "#,
    )
    .bind(course_id)
    .bind(total)
    .execute(executor)
    .await?;
    Ok(())
}
