use std::collections::BTreeMap;

use lms_core::{
    LessonType, Test, keywords,
    keywords::KeywordError,
    payload::{CoursePayload, SimulationPayload},
    upload::{FileRule, UploadRuleError},
};
use thiserror::Error;

use crate::{
    draft::{
        Body, FormContext, ItemId, LessonDraft, LessonUpdate, PendingFile, SectionDraft, StepDraft, StepUpdate,
        non_empty,
    },
    errors::{ErrorKey, ErrorMap},
    test_editor::TestEditor,
};

/// Why a file could not be attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("no such item")]
    NoSuchItem,
    #[error("{0} lessons do not take files")]
    NotAFileLesson(LessonType),
    #[error(transparent)]
    Rule(#[from] UploadRuleError),
}

/// The parts of the form that count for the unsaved-changes check.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    title: String,
    description: String,
    keywords: Vec<String>,
    image_url: Option<String>,
    has_pending_image: bool,
    body: Body,
}

/// The authoring form: a draft course or simulation with its pending
/// uploads and field errors.
#[derive(Debug, Clone)]
pub struct FormState {
    pub(crate) ctx: FormContext,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) keywords: Vec<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) body: Body,
    pub(crate) pending_image: Option<PendingFile>,
    pub(crate) pending_files: BTreeMap<ItemId, PendingFile>,
    pub(crate) errors: ErrorMap,
    pub(crate) loading: bool,
    next_id: u64,
    initial: Snapshot,
}

impl FormState {
    fn with_body(ctx: FormContext, body: Body) -> Self {
        let mut state = Self {
            ctx,
            title: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            image_url: None,
            body,
            pending_image: None,
            pending_files: BTreeMap::new(),
            errors: ErrorMap::new(),
            loading: false,
            next_id: 0,
            initial: Snapshot {
                title: String::new(),
                description: String::new(),
                keywords: Vec::new(),
                image_url: None,
                has_pending_image: false,
                body: Body::Course { sections: Vec::new() },
            },
        };
        state.mark_clean();
        state
    }

    pub fn new_course(ctx: FormContext) -> Self {
        Self::with_body(ctx, Body::Course { sections: Vec::new() })
    }

    pub fn new_simulation(ctx: FormContext) -> Self {
        Self::with_body(ctx, Body::Simulation { steps: Vec::new() })
    }

    /// Load a saved course for editing.
    pub fn from_course(ctx: FormContext, course: &CoursePayload) -> Self {
        let mut state = Self::new_course(ctx);
        state.title = course.title.clone();
        state.description = course.description.clone();
        state.keywords = course.keywords.clone();
        state.image_url = course.image_url.clone();

        let mut sections = Vec::with_capacity(course.sections.len());
        for section in &course.sections {
            let lessons = section
                .lessons
                .iter()
                .map(|lesson| {
                    let mut draft = LessonDraft::empty(state.next_item_id());
                    draft.title = lesson.title.clone();
                    draft.lesson_type = lesson.lesson_type;
                    draft.content = lesson.content.clone();
                    draft.video_url = lesson.video_url.clone();
                    draft.document_url = lesson.document_url.clone();
                    draft.file_name = file_name_from_url(draft.video_url.as_deref().or(draft.document_url.as_deref()));
                    draft.test = lesson.test.clone();
                    draft.test_saved = lesson.lesson_type == LessonType::Test && draft.test.as_ref().is_some_and(|t| !t.is_empty());
                    draft
                })
                .collect();
            sections.push(SectionDraft {
                id: state.next_item_id(),
                title: section.title.clone(),
                lessons,
            });
        }
        state.body = Body::Course { sections };
        state.mark_clean();
        state
    }

    /// Load a saved simulation for editing.
    pub fn from_simulation(ctx: FormContext, simulation: &SimulationPayload) -> Self {
        let mut state = Self::new_simulation(ctx);
        state.title = simulation.title.clone();
        state.description = simulation.description.clone();
        state.keywords = simulation.keywords.clone();
        state.image_url = simulation.image_url.clone();

        let steps = simulation
            .steps
            .iter()
            .map(|step| {
                let mut draft = StepDraft::empty(state.next_item_id());
                draft.title = step.title.clone();
                draft.content = step.content.clone();
                draft.video_url = step.video_url.clone();
                draft.video_preview_url = step.video_preview_url.clone();
                draft.file_name = file_name_from_url(draft.video_url.as_deref());
                draft
            })
            .collect();
        state.body = Body::Simulation { steps };
        state.mark_clean();
        state
    }

    fn next_item_id(&mut self) -> ItemId {
        self.next_id += 1;
        ItemId(self.next_id)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            title: self.title.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            image_url: self.image_url.clone(),
            has_pending_image: self.pending_image.is_some(),
            body: self.body.clone(),
        }
    }

    /// Take the current draft as the new baseline for [`Self::is_dirty`].
    pub fn mark_clean(&mut self) {
        self.initial = self.snapshot();
    }

    /// Whether the draft differs from what was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.snapshot() != self.initial
    }

    /// Language and entity id the form was opened with.
    pub fn context(&self) -> FormContext {
        self.ctx
    }

    /// Current title as typed.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current description as typed.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Accepted keywords, trimmed and unique.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Stored URL of the cover image, if one is saved.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Course sections or simulation steps.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Field errors from the last validation or failed submit.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// True while a submit is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Cover image waiting for upload on submit.
    pub fn pending_image(&self) -> Option<&PendingFile> {
        self.pending_image.as_ref()
    }

    /// File waiting for upload for the lesson or step with this id.
    pub fn pending_file(&self, id: ItemId) -> Option<&PendingFile> {
        self.pending_files.get(&id)
    }

    /// Number of lesson and step files waiting for upload.
    pub fn pending_file_count(&self) -> usize {
        self.pending_files.len()
    }

    /// Course sections; empty for a simulation form.
    pub fn sections(&self) -> &[SectionDraft] {
        match &self.body {
            Body::Course { sections } => sections,
            Body::Simulation { .. } => &[],
        }
    }

    /// Simulation steps; empty for a course form.
    pub fn steps(&self) -> &[StepDraft] {
        match &self.body {
            Body::Simulation { steps } => steps,
            Body::Course { .. } => &[],
        }
    }

    fn sections_mut(&mut self) -> Option<&mut Vec<SectionDraft>> {
        match &mut self.body {
            Body::Course { sections } => Some(sections),
            Body::Simulation { .. } => None,
        }
    }

    fn steps_mut(&mut self) -> Option<&mut Vec<StepDraft>> {
        match &mut self.body {
            Body::Simulation { steps } => Some(steps),
            Body::Course { .. } => None,
        }
    }

    fn lesson_mut(&mut self, section: usize, lesson: usize) -> Option<&mut LessonDraft> {
        self.sections_mut()?.get_mut(section)?.lessons.get_mut(lesson)
    }

    /// Replace the title and clear its error.
    pub fn set_title(&mut self, value: impl Into<String>) {
        self.title = value.into();
        self.errors.remove(ErrorKey::Title);
    }

    /// Replace the description.
    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    // ---- cover image ----

    /// Stash a cover image for upload on submit.
    pub fn handle_image_upload(&mut self, file: PendingFile) -> Result<(), UploadRuleError> {
        if let Err(err) = FileRule::CoverImage.check(&file.name, &file.content_type, file.size()) {
            let message = self.ctx.lang.messages().upload_rule(&err);
            self.errors.insert(ErrorKey::Image, message);
            return Err(err);
        }
        self.pending_image = Some(file);
        self.errors.remove(ErrorKey::Image);
        Ok(())
    }

    /// Drop both the pending cover image and the stored one.
    pub fn remove_image(&mut self) {
        self.pending_image = None;
        self.image_url = None;
        self.errors.remove(ErrorKey::Image);
    }

    // ---- keywords ----

    /// Append a keyword after trimming and the duplicate check.
    pub fn add_keyword(&mut self, value: &str) -> Result<(), KeywordError> {
        let keyword = keywords::validate(&self.keywords, value, None)?;
        self.keywords.push(keyword);
        Ok(())
    }

    /// Replace the keyword at `index`, appending when the index is past the end.
    pub fn update_keyword(&mut self, index: usize, value: &str) -> Result<(), KeywordError> {
        if index >= self.keywords.len() {
            return self.add_keyword(value);
        }
        let keyword = keywords::validate(&self.keywords, value, Some(index))?;
        self.keywords[index] = keyword;
        Ok(())
    }

    /// Remove the keyword at `index`; out of range is ignored.
    pub fn remove_keyword(&mut self, index: usize) {
        if index < self.keywords.len() {
            self.keywords.remove(index);
        }
    }

    // ---- sections ----

    pub fn add_section(&mut self) -> Option<ItemId> {
        let id = self.next_item_id();
        self.sections_mut()?.push(SectionDraft {
            id,
            title: String::new(),
            lessons: Vec::new(),
        });
        Some(id)
    }

    /// Remove a section with its lessons and their pending files.
    pub fn remove_section(&mut self, idx: usize) -> bool {
        let Some(sections) = self.sections_mut() else {
            return false;
        };
        if idx >= sections.len() {
            return false;
        }
        let removed = sections.remove(idx);
        for lesson in &removed.lessons {
            self.pending_files.remove(&lesson.id);
        }
        self.errors.remove_section(idx);
        true
    }

    pub fn update_section_title(&mut self, idx: usize, value: impl Into<String>) {
        let Some(section) = self.sections_mut().and_then(|s| s.get_mut(idx)) else {
            return;
        };
        section.title = value.into();
        self.errors.remove(ErrorKey::Section(idx));
    }

    pub fn move_section(&mut self, from: usize, to: usize) -> bool {
        let Some(sections) = self.sections_mut() else {
            return false;
        };
        if !move_item(sections, from, to) {
            return false;
        }
        self.errors.move_section(from, to);
        true
    }

    // ---- lessons ----

    pub fn add_lesson(&mut self, section: usize) -> Option<ItemId> {
        let id = self.next_item_id();
        self.sections_mut()?
            .get_mut(section)?
            .lessons
            .push(LessonDraft::empty(id));
        self.errors.remove(ErrorKey::Course);
        self.errors.remove(ErrorKey::SectionLessons(section));
        Some(id)
    }

    pub fn remove_lesson(&mut self, section: usize, lesson: usize) -> bool {
        let Some(lessons) = self
            .sections_mut()
            .and_then(|s| s.get_mut(section))
            .map(|s| &mut s.lessons)
        else {
            return false;
        };
        if lesson >= lessons.len() {
            return false;
        }
        let removed = lessons.remove(lesson);
        self.pending_files.remove(&removed.id);
        self.errors.remove_lesson(section, lesson);
        true
    }

    pub fn move_lesson(&mut self, section: usize, from: usize, to: usize) -> bool {
        let Some(lessons) = self
            .sections_mut()
            .and_then(|s| s.get_mut(section))
            .map(|s| &mut s.lessons)
        else {
            return false;
        };
        if !move_item(lessons, from, to) {
            return false;
        }
        self.errors.move_lesson(section, from, to);
        true
    }

    /// Edit one field of a lesson.
    ///
    /// Changing the type discards everything tied to the old type, including
    /// a pending upload. Clearing a file URL also drops the pending file.
    pub fn update_lesson(&mut self, section: usize, lesson: usize, update: LessonUpdate) {
        let Some(draft) = self.lesson_mut(section, lesson) else {
            return;
        };
        let id = draft.id;
        let mut drop_pending = false;

        let cleared = match update {
            LessonUpdate::Title(value) => {
                draft.title = value;
                ErrorKey::LessonTitle { section, lesson }
            }
            LessonUpdate::Content(value) => {
                draft.content = value;
                ErrorKey::LessonContent { section, lesson }
            }
            LessonUpdate::Type(lesson_type) => {
                if draft.lesson_type != lesson_type {
                    draft.lesson_type = lesson_type;
                    draft.reset_content();
                    drop_pending = true;
                }
                ErrorKey::LessonContent { section, lesson }
            }
            LessonUpdate::VideoUrl(value) => {
                draft.video_url = non_empty(value);
                if draft.video_url.is_none() {
                    draft.file_name = None;
                    drop_pending = true;
                }
                ErrorKey::LessonContent { section, lesson }
            }
            LessonUpdate::DocumentUrl(value) => {
                draft.document_url = non_empty(value);
                if draft.document_url.is_none() {
                    draft.file_name = None;
                    drop_pending = true;
                }
                ErrorKey::LessonContent { section, lesson }
            }
        };

        if drop_pending {
            self.pending_files.remove(&id);
        }
        self.errors.remove(cleared);
    }

    /// Stash a file for a VIDEO or DOCUMENT lesson; it is uploaded on submit.
    pub fn handle_section_file_upload(
        &mut self,
        section: usize,
        lesson: usize,
        file: PendingFile,
    ) -> Result<(), AttachError> {
        let messages = self.ctx.lang.messages();
        let draft = self.lesson_mut(section, lesson).ok_or(AttachError::NoSuchItem)?;

        let rule = match draft.lesson_type {
            LessonType::Video => FileRule::LessonVideo,
            LessonType::Document => FileRule::Document,
            other => return Err(AttachError::NotAFileLesson(other)),
        };
        if let Err(err) = rule.check(&file.name, &file.content_type, file.size()) {
            draft.upload_error = Some(messages.upload_rule(&err));
            return Err(err.into());
        }

        draft.file_name = Some(file.name.clone());
        draft.upload_error = None;
        let id = draft.id;
        self.pending_files.insert(id, file);
        self.errors.remove(ErrorKey::LessonContent { section, lesson });
        Ok(())
    }

    /// Remove the lesson's file, stored or pending.
    pub fn remove_lesson_file(&mut self, section: usize, lesson: usize) {
        let Some(draft) = self.lesson_mut(section, lesson) else {
            return;
        };
        draft.video_url = None;
        draft.document_url = None;
        draft.file_name = None;
        draft.upload_error = None;
        let id = draft.id;
        self.pending_files.remove(&id);
    }

    // ---- lesson quiz ----

    /// Open the quiz editor for a TEST lesson. The lesson's quiz counts as
    /// unsaved until [`Self::save_lesson_test`] succeeds.
    pub fn edit_lesson_test(&mut self, section: usize, lesson: usize) -> Option<TestEditor> {
        let lang = self.ctx.lang;
        let draft = self.lesson_mut(section, lesson)?;
        if draft.lesson_type != LessonType::Test {
            return None;
        }
        draft.test_saved = false;
        Some(TestEditor::new(lang, draft.test.as_ref()))
    }

    /// Mirror an in-progress quiz into the lesson content.
    pub fn update_lesson_test_draft(&mut self, section: usize, lesson: usize, test: &Test) {
        if let Some(draft) = self.lesson_mut(section, lesson) {
            draft.content = serde_json::to_string(test).unwrap_or_default();
            draft.test_saved = false;
        }
    }

    /// Validate the editor and, if valid, freeze its quiz into the lesson.
    pub fn save_lesson_test(&mut self, section: usize, lesson: usize, editor: &mut TestEditor) -> bool {
        let Some(test) = editor.validate_and_save() else {
            return false;
        };
        let Some(draft) = self.lesson_mut(section, lesson) else {
            return false;
        };
        draft.content = serde_json::to_string(&test).unwrap_or_default();
        draft.test = Some(test);
        draft.test_saved = true;
        self.errors.remove(ErrorKey::LessonContent { section, lesson });
        true
    }

    pub fn delete_lesson_test(&mut self, section: usize, lesson: usize) {
        if let Some(draft) = self.lesson_mut(section, lesson) {
            draft.content.clear();
            draft.test = None;
            draft.test_saved = false;
        }
    }

    // ---- steps ----

    pub fn add_step(&mut self) -> Option<ItemId> {
        let id = self.next_item_id();
        self.steps_mut()?.push(StepDraft::empty(id));
        self.errors.remove(ErrorKey::Simulation);
        Some(id)
    }

    pub fn remove_step(&mut self, idx: usize) -> bool {
        let Some(steps) = self.steps_mut() else {
            return false;
        };
        if idx >= steps.len() {
            return false;
        }
        let removed = steps.remove(idx);
        self.pending_files.remove(&removed.id);
        self.errors.remove_step(idx);
        true
    }

    pub fn update_step(&mut self, idx: usize, update: StepUpdate) {
        let Some(step) = self.steps_mut().and_then(|s| s.get_mut(idx)) else {
            return;
        };
        let id = step.id;
        let mut drop_pending = false;

        let cleared = match update {
            StepUpdate::Title(value) => {
                step.title = value;
                Some(ErrorKey::StepTitle(idx))
            }
            StepUpdate::Content(value) => {
                step.content = value;
                Some(ErrorKey::StepContent(idx))
            }
            StepUpdate::VideoUrl(value) => {
                step.video_url = non_empty(value);
                if step.video_url.is_none() {
                    step.file_name = None;
                    drop_pending = true;
                }
                Some(ErrorKey::StepVideo(idx))
            }
            StepUpdate::VideoPreviewUrl(value) => {
                step.video_preview_url = non_empty(value);
                None
            }
        };

        if drop_pending {
            self.pending_files.remove(&id);
        }
        if let Some(key) = cleared {
            self.errors.remove(key);
        }
    }

    pub fn handle_step_file_upload(&mut self, idx: usize, file: PendingFile) -> Result<(), AttachError> {
        let messages = self.ctx.lang.messages();
        let step = self
            .steps_mut()
            .and_then(|s| s.get_mut(idx))
            .ok_or(AttachError::NoSuchItem)?;

        if let Err(err) = FileRule::StepVideo.check(&file.name, &file.content_type, file.size()) {
            step.upload_error = Some(messages.upload_rule(&err));
            return Err(err.into());
        }

        step.file_name = Some(file.name.clone());
        step.upload_error = None;
        let id = step.id;
        self.pending_files.insert(id, file);
        self.errors.remove(ErrorKey::StepVideo(idx));
        Ok(())
    }

    pub fn move_step(&mut self, from: usize, to: usize) -> bool {
        let Some(steps) = self.steps_mut() else {
            return false;
        };
        if !move_item(steps, from, to) {
            return false;
        }
        self.errors.move_step(from, to);
        true
    }
}

/// Extract the item at `from` and reinsert it at `to`.
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() || from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

fn file_name_from_url(url: Option<&str>) -> Option<String> {
    let name = url?.rsplit('/').next()?;
    // stored keys are `{8 hex}-{name}`
    let name = match name.split_once('-') {
        Some((prefix, rest)) if prefix.len() == 8 && prefix.chars().all(|c| c.is_ascii_hexdigit()) => rest,
        _ => name,
    };
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use lms_core::{QuestionType, i18n::Lang};

    use super::*;
    use crate::test_editor::{OptionUpdate, QuestionUpdate};

    fn video(name: &str, size: usize) -> PendingFile {
        PendingFile::new(name, "video/mp4", vec![0; size])
    }

    fn course_with_lessons(counts: &[usize]) -> FormState {
        let mut form = FormState::new_course(FormContext::create(Lang::En));
        for (s, &count) in counts.iter().enumerate() {
            form.add_section();
            for _ in 0..count {
                form.add_lesson(s);
            }
        }
        form
    }

    #[test]
    fn test_new_course_form_is_clean() {
        let form = FormState::new_course(FormContext::default());
        assert!(!form.is_dirty());
        assert!(form.sections().is_empty());
        assert!(form.steps().is_empty());
    }

    #[test]
    fn test_add_lesson_clears_course_and_section_errors() {
        let mut form = course_with_lessons(&[0]);
        form.errors.insert(ErrorKey::Course, "add a lesson");
        form.errors.insert(ErrorKey::SectionLessons(0), "add lessons");

        form.add_lesson(0);

        assert!(form.errors().is_empty());
        assert_eq!(form.sections()[0].lessons[0].lesson_type, LessonType::Text);
    }

    #[test]
    fn test_update_section_title_clears_its_error() {
        let mut form = course_with_lessons(&[1, 1]);
        form.errors.insert(ErrorKey::Section(0), "x");
        form.errors.insert(ErrorKey::Section(1), "y");

        form.update_section_title(1, "Basics");

        assert!(form.errors().contains(ErrorKey::Section(0)));
        assert!(!form.errors().contains(ErrorKey::Section(1)));
    }

    #[test]
    fn test_pending_file_follows_its_lesson_through_moves() {
        let mut form = course_with_lessons(&[1, 1, 1]);
        form.update_lesson(2, 0, LessonUpdate::Type(LessonType::Video));
        form.handle_section_file_upload(2, 0, video("c.mp4", 10)).unwrap();
        let id = form.sections()[2].lessons[0].id;

        assert!(form.remove_section(0));
        assert!(form.move_section(1, 0));

        assert_eq!(form.sections()[0].lessons[0].id, id);
        assert_eq!(form.pending_file(id).map(|f| f.name.as_str()), Some("c.mp4"));
        assert_eq!(form.pending_file_count(), 1);
    }

    #[test]
    fn test_remove_section_drops_its_pending_files() {
        let mut form = course_with_lessons(&[2, 1]);
        form.update_lesson(0, 1, LessonUpdate::Type(LessonType::Video));
        form.handle_section_file_upload(0, 1, video("a.mp4", 1)).unwrap();
        form.update_lesson(1, 0, LessonUpdate::Type(LessonType::Video));
        form.handle_section_file_upload(1, 0, video("b.mp4", 1)).unwrap();

        form.remove_section(0);

        assert_eq!(form.pending_file_count(), 1);
        let remaining = form.sections()[0].lessons[0].id;
        assert!(form.pending_file(remaining).is_some());
    }

    #[test]
    fn test_type_change_discards_pending_video_and_error() {
        let mut form = course_with_lessons(&[1]);
        form.update_lesson(0, 0, LessonUpdate::Type(LessonType::Video));
        form.handle_section_file_upload(0, 0, video("clip.mp4", 5)).unwrap();
        form.errors.insert(ErrorKey::LessonContent { section: 0, lesson: 0 }, "upload failed");

        form.update_lesson(0, 0, LessonUpdate::Type(LessonType::Text));

        let lesson = &form.sections()[0].lessons[0];
        assert_eq!(lesson.file_name, None);
        assert_eq!(lesson.video_url, None);
        assert_eq!(form.pending_file_count(), 0);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_clearing_video_url_drops_pending_file() {
        let mut form = course_with_lessons(&[1]);
        form.update_lesson(0, 0, LessonUpdate::Type(LessonType::Video));
        form.handle_section_file_upload(0, 0, video("clip.mp4", 5)).unwrap();

        form.update_lesson(0, 0, LessonUpdate::VideoUrl(String::new()));

        assert_eq!(form.pending_file_count(), 0);
    }

    #[test]
    fn test_file_rules_apply_at_attach_time() {
        let mut form = course_with_lessons(&[1]);
        assert_eq!(
            form.handle_section_file_upload(0, 0, video("a.mp4", 1)),
            Err(AttachError::NotAFileLesson(LessonType::Text))
        );

        form.update_lesson(0, 0, LessonUpdate::Type(LessonType::Document));
        let exe = PendingFile::new("x.exe", "application/x-msdownload", vec![1]);
        assert_eq!(
            form.handle_section_file_upload(0, 0, exe),
            Err(AttachError::Rule(UploadRuleError::UnsupportedDocument))
        );
        assert!(form.sections()[0].lessons[0].upload_error.is_some());

        let pdf = PendingFile::new("notes.pdf", "application/pdf", vec![1]);
        form.handle_section_file_upload(0, 0, pdf).unwrap();
        assert_eq!(form.sections()[0].lessons[0].upload_error, None);
        assert_eq!(form.sections()[0].lessons[0].file_name.as_deref(), Some("notes.pdf"));
    }

    #[test]
    fn test_remove_lesson_shifts_errors() {
        let mut form = course_with_lessons(&[3]);
        form.errors.insert(ErrorKey::LessonTitle { section: 0, lesson: 2 }, "t");

        form.remove_lesson(0, 0);

        assert!(form.errors().contains(ErrorKey::LessonTitle { section: 0, lesson: 1 }));
        assert_eq!(form.sections()[0].lessons.len(), 2);
    }

    #[test]
    fn test_move_out_of_range_is_ignored() {
        let mut form = course_with_lessons(&[1, 1]);
        assert!(!form.move_section(0, 5));
        assert!(!form.move_lesson(0, 0, 1));
        assert!(!form.move_step(0, 1));
    }

    #[test]
    fn test_lesson_quiz_lifecycle() {
        let mut form = course_with_lessons(&[1]);
        assert!(form.edit_lesson_test(0, 0).is_none());

        form.update_lesson(0, 0, LessonUpdate::Type(LessonType::Test));
        let mut editor = form.edit_lesson_test(0, 0).unwrap();
        assert!(!form.save_lesson_test(0, 0, &mut editor));

        editor.update_question(0, QuestionUpdate::Text("2 + 2?".into()));
        editor.update_question(0, QuestionUpdate::Type(QuestionType::Single));
        editor.update_option(0, 0, OptionUpdate::Text("4".into()));
        editor.update_option(0, 1, OptionUpdate::Text("5".into()));
        form.update_lesson_test_draft(0, 0, &editor.test());
        assert!(!form.sections()[0].lessons[0].test_saved);

        assert!(form.save_lesson_test(0, 0, &mut editor));
        let lesson = &form.sections()[0].lessons[0];
        assert!(lesson.test_saved);
        assert!(lesson.content.contains("2 + 2?"));

        form.delete_lesson_test(0, 0);
        let lesson = &form.sections()[0].lessons[0];
        assert!(lesson.test.is_none());
        assert!(lesson.content.is_empty());
    }

    #[test]
    fn test_cover_image_rules() {
        let mut form = FormState::new_course(FormContext::create(Lang::En));
        let pdf = PendingFile::new("a.pdf", "application/pdf", vec![1]);
        assert_eq!(form.handle_image_upload(pdf), Err(UploadRuleError::NotImage));
        assert!(form.errors().contains(ErrorKey::Image));

        let png = PendingFile::new("a.png", "image/png", vec![1]);
        form.handle_image_upload(png).unwrap();
        assert!(!form.errors().contains(ErrorKey::Image));
        assert!(form.is_dirty());
    }

    #[test]
    fn test_keyword_editing() {
        let mut form = FormState::new_course(FormContext::default());
        form.add_keyword(" ECG ").unwrap();
        form.add_keyword("heart").unwrap();
        assert_eq!(form.add_keyword("ecg"), Err(KeywordError::Duplicate));
        assert_eq!(form.add_keyword("two words"), Err(KeywordError::ContainsSpace));

        form.update_keyword(1, "Cardio").unwrap();
        assert_eq!(form.keywords(), ["ecg", "cardio"]);

        form.remove_keyword(0);
        assert_eq!(form.keywords(), ["cardio"]);
    }

    #[test]
    fn test_step_operations() {
        let mut form = FormState::new_simulation(FormContext::create(Lang::En));
        assert!(form.add_section().is_none());
        form.add_step();
        form.add_step();
        form.errors.insert(ErrorKey::StepTitle(1), "t");

        form.update_step(0, StepUpdate::Title("Intubation".into()));
        let big = video("big.mp4", 50 * 1024 * 1024 + 1);
        assert!(matches!(
            form.handle_step_file_upload(0, big),
            Err(AttachError::Rule(UploadRuleError::TooLarge { limit_mb: 50 }))
        ));
        form.handle_step_file_upload(0, video("ok.mp4", 1)).unwrap();

        assert!(form.move_step(0, 1));
        assert!(form.errors().contains(ErrorKey::StepTitle(0)));
        assert_eq!(form.steps()[1].title, "Intubation");

        assert!(form.remove_step(1));
        assert_eq!(form.pending_file_count(), 0);
    }

    #[test]
    fn test_dirty_check_against_loaded_course() {
        let payload = CoursePayload {
            title: "Cardio".into(),
            sections: vec![lms_core::payload::SectionPayload {
                title: "S".into(),
                order: 0,
                lessons: vec![lms_core::payload::LessonPayload {
                    title: "L".into(),
                    lesson_type: LessonType::Video,
                    video_url: Some("https://s3/b/videos/0a1b2c3d-intro.mp4".into()),
                    ..Default::default()
                }],
            }],
            ..CoursePayload::default()
        };
        let mut form = FormState::from_course(FormContext::create(Lang::Ua), &payload);
        assert!(!form.is_dirty());
        assert_eq!(form.sections()[0].lessons[0].file_name.as_deref(), Some("intro.mp4"));

        form.set_title("Cardio 2");
        assert!(form.is_dirty());
        form.set_title("Cardio");
        assert!(!form.is_dirty());
    }
}
