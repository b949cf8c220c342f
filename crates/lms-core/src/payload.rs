//! JSON bodies exchanged between the authoring form and the API.
//!
//! Every field other than `title` defaults, so a slug pre-check can send just
//! `{"title": ..., "lang": ...}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{content::LessonType, i18n::Lang, quiz::Test};

/// Header that turns a create/update request into a slug availability check.
pub const ONLY_CHECK_SLUG_HEADER: &str = "x-only-check-slug";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoursePayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sections: Vec<SectionPayload>,
    /// Sum of lesson counts across sections. Informational; the server recounts.
    #[serde(default)]
    pub total_lessons: i32,
    #[serde(default)]
    pub lang: Lang,
}

impl CoursePayload {
    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub title: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub lessons: Vec<LessonPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonPayload {
    pub title: String,
    #[serde(rename = "type", default)]
    pub lesson_type: LessonType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub test: Option<Test>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub steps: Vec<StepPayload>,
    #[serde(default)]
    pub lang: Lang,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepPayload {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_preview_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

/// Returned by create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntity {
    pub id: Uuid,
    pub slug: String,
    pub version: i32,
}

/// Returned by a slug-only check when the slug is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugCheck {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}
