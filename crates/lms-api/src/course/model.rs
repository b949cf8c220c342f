use chrono::{DateTime, Utc};
use lms_core::{ProgressStatus, progress};
use lms_db::models::{Course, CourseProgress, CourseWithProgress, Lesson, Section};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    /// Present only when the caller is authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SectionDetail {
    #[serde(flatten)]
    pub section: Section,
    pub lessons: Vec<LessonDetail>,
}

/// The caller's standing in one course.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub status: ProgressStatus,
    pub completed_lessons_count: i32,
    pub total_lessons: i32,
    pub progress: i32,
    pub started_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressSummary {
    pub fn new(row: &CourseProgress, total_lessons: i32) -> Self {
        Self {
            status: row.status,
            completed_lessons_count: row.completed_lessons_count,
            total_lessons,
            progress: progress::percent(row.completed_lessons_count, total_lessons),
            started_at: row.started_at,
            last_access_at: row.last_access_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionDetail>,
    pub user_progress: Option<ProgressSummary>,
}

impl CourseDetail {
    /// Nest `lessons` under their sections, keeping the order they came in.
    ///
    /// With `completed` set, each lesson is flagged with whether its id is in it.
    pub fn assemble(
        course: Course,
        sections: Vec<Section>,
        lessons: Vec<Lesson>,
        completed: Option<&[Uuid]>,
        user_progress: Option<ProgressSummary>,
    ) -> Self {
        let mut sections: Vec<SectionDetail> = sections
            .into_iter()
            .map(|section| SectionDetail {
                section,
                lessons: Vec::new(),
            })
            .collect();

        for lesson in lessons {
            let Some(section) = sections.iter_mut().find(|s| s.section.id == lesson.section_id) else {
                continue;
            };
            let completed = completed.map(|ids| ids.contains(&lesson.id));
            section.lessons.push(LessonDetail { lesson, completed });
        }

        Self {
            course,
            sections,
            user_progress,
        }
    }
}

/// A row of the in-progress and completed listings.
#[derive(Debug, Serialize)]
pub struct CourseProgressItem {
    #[serde(flatten)]
    pub entry: CourseWithProgress,
    pub progress: i32,
}

impl From<CourseWithProgress> for CourseProgressItem {
    fn from(entry: CourseWithProgress) -> Self {
        let progress = match entry.status {
            ProgressStatus::Completed => 100,
            ProgressStatus::InProgress => progress::percent(entry.completed_lessons_count, entry.course.total_lessons),
        };
        Self { entry, progress }
    }
}
