//! Server-side checks on course and simulation bodies.
//!
//! The authoring form validates the same rules field by field; here the first
//! violation rejects the request.

use lms_core::{
    LessonType,
    i18n::Messages,
    keywords,
    payload::{CoursePayload, LessonPayload, SimulationPayload},
};
use validator::ValidateUrl;

use crate::error::ApiError;

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

fn check_url(url: Option<&String>, m: &Messages) -> Result<(), ApiError> {
    match url {
        Some(url) if !url.validate_url() => Err(invalid(m.invalid_request)),
        _ => Ok(()),
    }
}

/// Reject empty, multi-word or duplicate keywords and return them normalized.
pub fn validate_keywords(list: &[String], m: &Messages) -> Result<Vec<String>, ApiError> {
    let mut accepted: Vec<String> = Vec::with_capacity(list.len());
    for keyword in list {
        let keyword = keywords::validate(&accepted, keyword, None).map_err(|e| invalid(m.keyword(&e)))?;
        accepted.push(keyword);
    }
    Ok(accepted)
}

fn validate_lesson(lesson: &LessonPayload, m: &Messages) -> Result<(), ApiError> {
    if lesson.title.trim().is_empty() {
        return Err(invalid(m.lesson_title_required));
    }
    match lesson.lesson_type {
        LessonType::Text if lesson.content.trim().is_empty() => Err(invalid(m.lesson_content_empty)),
        LessonType::Video if lesson.video_url.is_none() => Err(invalid(m.lesson_video_required)),
        LessonType::Document if lesson.document_url.is_none() => Err(invalid(m.lesson_document_required)),
        LessonType::Test if lesson.test.as_ref().is_none_or(|t| t.is_empty()) => Err(invalid(m.test_not_saved)),
        LessonType::Video => check_url(lesson.video_url.as_ref(), m),
        LessonType::Document => check_url(lesson.document_url.as_ref(), m),
        LessonType::Text | LessonType::Test => Ok(()),
    }
}

pub fn validate_course(course: &CoursePayload, m: &Messages) -> Result<(), ApiError> {
    if course.title.trim().is_empty() {
        return Err(invalid(m.course_title_required));
    }
    check_url(course.image_url.as_ref(), m)?;
    if course.lesson_count() == 0 {
        return Err(invalid(m.course_needs_lesson));
    }
    for section in &course.sections {
        if section.title.trim().is_empty() {
            return Err(invalid(m.section_title_required));
        }
        if section.lessons.is_empty() {
            return Err(invalid(m.section_needs_lesson));
        }
        for lesson in &section.lessons {
            validate_lesson(lesson, m)?;
        }
    }
    Ok(())
}

pub fn validate_simulation(simulation: &SimulationPayload, m: &Messages) -> Result<(), ApiError> {
    if simulation.title.trim().is_empty() {
        return Err(invalid(m.simulation_title_required));
    }
    check_url(simulation.image_url.as_ref(), m)?;
    if simulation.steps.is_empty() {
        return Err(invalid(m.simulation_needs_step));
    }
    for step in &simulation.steps {
        if step.title.trim().is_empty() {
            return Err(invalid(m.step_title_required));
        }
        if step.content.trim().is_empty() {
            return Err(invalid(m.step_content_required));
        }
        if step.video_url.is_none() {
            return Err(invalid(m.step_video_required));
        }
        check_url(step.video_url.as_ref(), m)?;
        check_url(step.video_preview_url.as_ref(), m)?;
    }
    Ok(())
}
