use chrono::{DateTime, Utc};
use lms_core::{LessonType, ProgressStatus, Test};
use serde::Serialize;
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// Course header row; sections and lessons are loaded separately.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    /// Unique, derived from the title on every save
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Lower-case single words, unique per course
    pub keywords: Vec<String>,
    /// Starts at 1, incremented once per update
    pub version: i32,
    /// Cached lesson count; 0 for rows written before the cache existed
    pub total_lessons: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Section {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub content: String,
    pub video_url: Option<String>,
    pub document_url: Option<String>,
    pub test: Option<Json<Test>>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Simulation {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
    pub version: i32,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Step {
    pub id: Uuid,
    pub simulation_id: Uuid,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub video_preview_url: Option<String>,
    pub position: i32,
}

/// One user's progress through one course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ProgressStatus,
    pub completed_lessons_count: i32,
    pub started_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A course joined with the requesting user's progress row, for the
/// in-progress and completed listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseWithProgress {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    #[sqlx(try_from = "String")]
    pub status: ProgressStatus,
    pub completed_lessons_count: i32,
    pub last_access_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
