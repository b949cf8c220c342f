//! In-memory draft of a course or simulation being edited.

use lms_core::{LessonType, Test, i18n::Lang};
use serde::Serialize;
use uuid::Uuid;

/// Stable identity of a section, lesson or step within one form session.
///
/// Positions change on every move or removal; ids do not, so anything
/// attached to an item (a pending upload) is keyed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItemId(pub(crate) u64);

/// A locally selected file that has not been uploaded yet.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// File name as selected
    pub name: String,
    /// MIME type reported for the file
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Explicit settings for a form session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormContext {
    /// Language of every message the form produces
    pub lang: Lang,
    /// `Some` when editing a saved entity, `None` when creating one
    pub entity_id: Option<Uuid>,
}

impl FormContext {
    /// Context for a new, unsaved entity.
    pub fn create(lang: Lang) -> Self {
        Self {
            lang,
            entity_id: None,
        }
    }

    /// Context for editing the saved entity `entity_id`.
    pub fn edit(lang: Lang, entity_id: Uuid) -> Self {
        Self {
            lang,
            entity_id: Some(entity_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDraft {
    pub id: ItemId,
    pub title: String,
    pub lessons: Vec<LessonDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonDraft {
    pub id: ItemId,
    pub title: String,
    pub lesson_type: LessonType,
    /// Text body; for TEST lessons the serialized quiz
    pub content: String,
    pub video_url: Option<String>,
    pub document_url: Option<String>,
    /// Name of the selected or uploaded file, for display
    pub file_name: Option<String>,
    /// Message from the last failed attach or upload of this lesson's file
    pub upload_error: Option<String>,
    pub test: Option<Test>,
    /// The quiz is saved and shown read-only; cleared while it is being edited
    pub test_saved: bool,
}

impl LessonDraft {
    pub(crate) fn empty(id: ItemId) -> Self {
        Self {
            id,
            title: String::new(),
            lesson_type: LessonType::Text,
            content: String::new(),
            video_url: None,
            document_url: None,
            file_name: None,
            upload_error: None,
            test: None,
            test_saved: false,
        }
    }

    /// Forget everything that belongs to the current content type.
    pub(crate) fn reset_content(&mut self) {
        self.content.clear();
        self.video_url = None;
        self.document_url = None;
        self.file_name = None;
        self.upload_error = None;
        self.test = None;
        self.test_saved = false;
    }

    pub(crate) fn has_saved_test(&self) -> bool {
        self.test_saved && self.test.as_ref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDraft {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub video_preview_url: Option<String>,
    pub file_name: Option<String>,
    pub upload_error: Option<String>,
}

impl StepDraft {
    pub(crate) fn empty(id: ItemId) -> Self {
        Self {
            id,
            title: String::new(),
            content: String::new(),
            video_url: None,
            video_preview_url: None,
            file_name: None,
            upload_error: None,
        }
    }
}

/// The ordered content of the entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Body {
    Course { sections: Vec<SectionDraft> },
    Simulation { steps: Vec<StepDraft> },
}

/// A single-field edit of a lesson.
#[derive(Debug, Clone, PartialEq)]
pub enum LessonUpdate {
    Title(String),
    Content(String),
    Type(LessonType),
    VideoUrl(String),
    DocumentUrl(String),
}

/// A single-field edit of a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepUpdate {
    Title(String),
    Content(String),
    VideoUrl(String),
    VideoPreviewUrl(String),
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
