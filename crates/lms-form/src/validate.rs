use lms_core::LessonType;

use crate::{
    draft::Body,
    errors::{ErrorKey, ErrorMap},
    state::FormState,
};

impl FormState {
    /// Check the whole draft and replace the error map with every violation
    /// found. Returns `true` when the draft is valid.
    pub fn validate(&mut self) -> bool {
        self.errors = self.collect_errors();
        self.errors.is_empty()
    }

    fn collect_errors(&self) -> ErrorMap {
        let messages = self.ctx.lang.messages();
        let mut errors = ErrorMap::new();

        match &self.body {
            Body::Course { sections } => {
                if self.title.trim().is_empty() {
                    errors.insert(ErrorKey::Title, messages.course_title_required);
                }

                let mut total_lessons = 0;
                for (s, section) in sections.iter().enumerate() {
                    if section.title.trim().is_empty() {
                        errors.insert(ErrorKey::Section(s), messages.section_title_required);
                    }
                    if section.lessons.is_empty() {
                        errors.insert(ErrorKey::SectionLessons(s), messages.section_needs_lesson);
                    }
                    total_lessons += section.lessons.len();

                    for (l, lesson) in section.lessons.iter().enumerate() {
                        if lesson.title.trim().is_empty() {
                            errors.insert(ErrorKey::LessonTitle { section: s, lesson: l }, messages.lesson_title_required);
                        }

                        let pending = self.pending_files.contains_key(&lesson.id);
                        let content_error = match lesson.lesson_type {
                            LessonType::Video if lesson.video_url.is_none() && !pending => {
                                Some(messages.lesson_video_required)
                            }
                            LessonType::Document if lesson.document_url.is_none() && !pending => {
                                Some(messages.lesson_document_required)
                            }
                            LessonType::Text if lesson.content.trim().is_empty() => Some(messages.lesson_content_empty),
                            LessonType::Test if !lesson.has_saved_test() => Some(messages.test_not_saved),
                            _ => None,
                        };
                        if let Some(message) = content_error {
                            errors.insert(ErrorKey::LessonContent { section: s, lesson: l }, message);
                        }
                    }
                }

                if total_lessons == 0 {
                    errors.insert(ErrorKey::Course, messages.course_needs_lesson);
                }
            }
            Body::Simulation { steps } => {
                if self.title.trim().is_empty() {
                    errors.insert(ErrorKey::Title, messages.simulation_title_required);
                }

                for (i, step) in steps.iter().enumerate() {
                    if step.title.trim().is_empty() {
                        errors.insert(ErrorKey::StepTitle(i), messages.step_title_required);
                    }
                    if step.content.trim().is_empty() {
                        errors.insert(ErrorKey::StepContent(i), messages.step_content_required);
                    }
                    if step.video_url.is_none() && !self.pending_files.contains_key(&step.id) {
                        errors.insert(ErrorKey::StepVideo(i), messages.step_video_required);
                    }
                }

                if steps.is_empty() {
                    errors.insert(ErrorKey::Simulation, messages.simulation_needs_step);
                }
            }
        }

        errors
    }
}
