use lms_core::{LessonType, payload::CoursePayload};
use lms_db::{
    models::Course,
    repositories::{course as course_repo, progress as progress_repo},
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Insert every section and lesson of `payload`, positioned by list index.
async fn write_structure(conn: &mut PgConnection, course_id: Uuid, payload: &CoursePayload) -> Result<(), sqlx::Error> {
    for (s, section) in payload.sections.iter().enumerate() {
        let section_id = course_repo::insert_section(&mut *conn, course_id, section, s as i32).await?;
        for (l, lesson) in section.lessons.iter().enumerate() {
            course_repo::insert_lesson(&mut *conn, section_id, lesson, l as i32).await?;
        }
    }
    Ok(())
}

fn fields<'a>(payload: &'a CoursePayload, slug: &'a str, keywords: &'a [String]) -> course_repo::CourseFields<'a> {
    course_repo::CourseFields {
        title: payload.title.trim(),
        slug,
        description: &payload.description,
        image_url: payload.image_url.as_deref(),
        keywords,
        total_lessons: payload.lesson_count() as i32,
    }
}

/// Create the course with its whole structure in one transaction.
pub async fn create(
    pool: &PgPool,
    payload: &CoursePayload,
    slug: &str,
    keywords: &[String],
    author_id: Uuid,
) -> Result<Course, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let course = course_repo::insert_course(&mut *tx, &fields(payload, slug, keywords), author_id).await?;
    write_structure(&mut *tx, course.id, payload).await?;

    tx.commit().await?;
    Ok(course)
}

/// Replace the course header and structure in one transaction.
///
/// Lesson ids change, so every user's progress on the course is discarded.
/// Returns `None` if the course vanished.
pub async fn replace(
    pool: &PgPool,
    id: Uuid,
    payload: &CoursePayload,
    slug: &str,
    keywords: &[String],
) -> Result<Option<Course>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(course) = course_repo::update_course(&mut *tx, id, &fields(payload, slug, keywords)).await? else {
        return Ok(None);
    };
    course_repo::delete_sections(&mut *tx, id).await?;
    write_structure(&mut *tx, id, payload).await?;
    let reset = progress_repo::reset_course(&mut *tx, id).await?;

    tx.commit().await?;

    if reset > 0 {
        tracing::info!(course_id = %id, progress_rows = reset, "course structure replaced, progress reset");
    }
    Ok(Some(course))
}

/// Every stored-file URL the payload references.
pub fn referenced_urls(payload: &CoursePayload) -> Vec<&str> {
    let lesson_urls = payload
        .sections
        .iter()
        .flat_map(|s| &s.lessons)
        .filter_map(|l| match l.lesson_type {
            LessonType::Video => l.video_url.as_deref(),
            LessonType::Document => l.document_url.as_deref(),
            LessonType::Text | LessonType::Test => None,
        });
    payload.image_url.as_deref().into_iter().chain(lesson_urls).collect()
}
