//! User-facing message catalogue.
//!
//! The platform is Ukrainian-first; English is the only other language.
//! Anything that is not exactly `en` falls back to Ukrainian.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{keywords::KeywordError, upload::UploadRuleError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ua,
    En,
}

impl Lang {
    pub fn from_code(code: &str) -> Self {
        if code == "en" { Self::En } else { Self::Ua }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Ua => "ua",
            Self::En => "en",
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Self::Ua => &UA,
            Self::En => &EN,
        }
    }
}

// Unknown codes select the default language rather than failing.
impl<'de> Deserialize<'de> for Lang {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

/// Every localized string the service and the form engine emit.
#[derive(Debug)]
pub struct Messages {
    // request / authorization
    pub not_authorized: &'static str,
    pub not_enough_rights: &'static str,
    pub internal_error: &'static str,
    pub invalid_request: &'static str,

    // lookups
    pub course_not_found: &'static str,
    pub simulation_not_found: &'static str,
    pub lesson_not_found: &'static str,
    pub lesson_id_required: &'static str,
    pub file_required: &'static str,

    // conflicts / transactions
    pub course_already_exists: &'static str,
    pub simulation_already_exists: &'static str,
    pub course_progress_error: &'static str,
    pub upload_error: &'static str,
    pub lesson_completed: &'static str,
    pub lesson_already_completed: &'static str,

    // form validation
    pub course_title_required: &'static str,
    pub simulation_title_required: &'static str,
    pub section_title_required: &'static str,
    pub section_needs_lesson: &'static str,
    pub course_needs_lesson: &'static str,
    pub simulation_needs_step: &'static str,
    pub lesson_title_required: &'static str,
    pub lesson_video_required: &'static str,
    pub lesson_document_required: &'static str,
    pub lesson_content_empty: &'static str,
    pub test_not_saved: &'static str,
    pub step_title_required: &'static str,
    pub step_content_required: &'static str,
    pub step_video_required: &'static str,
    pub question_text_required: &'static str,
    pub option_text_required: &'static str,

    // uploads
    pub image_upload_failed: &'static str,
    pub file_upload_failed: &'static str,
    pub not_image: &'static str,
    pub not_video: &'static str,
    pub unsupported_document: &'static str,
    pub file_too_large: &'static str,

    // keywords
    pub keyword_empty: &'static str,
    pub keyword_single_word: &'static str,
    pub keyword_duplicate: &'static str,
}

impl Messages {
    pub fn upload_rule(&self, err: &UploadRuleError) -> String {
        match err {
            UploadRuleError::NotImage => self.not_image.to_string(),
            UploadRuleError::NotVideo => self.not_video.to_string(),
            UploadRuleError::UnsupportedDocument => self.unsupported_document.to_string(),
            UploadRuleError::TooLarge { limit_mb } => format!("{} ({limit_mb}MB)", self.file_too_large),
        }
    }

    pub fn keyword(&self, err: &KeywordError) -> &'static str {
        match err {
            KeywordError::Empty => self.keyword_empty,
            KeywordError::ContainsSpace => self.keyword_single_word,
            KeywordError::Duplicate => self.keyword_duplicate,
        }
    }
}

static UA: Messages = Messages {
    not_authorized: "Не авторизовано",
    not_enough_rights: "Недостатньо прав",
    internal_error: "Сталася помилка",
    invalid_request: "Некоректний запит",

    course_not_found: "Курс не знайдено",
    simulation_not_found: "Симуляцію не знайдено",
    lesson_not_found: "Урок не знайдено",
    lesson_id_required: "Потрібен ідентифікатор уроку",
    file_required: "Файл обов'язковий",

    course_already_exists: "Курс з такою назвою вже існує",
    simulation_already_exists: "Симуляція з такою назвою вже існує",
    course_progress_error: "Помилка оновлення прогресу курсу",
    upload_error: "Помилка завантаження файлу",
    lesson_completed: "Урок завершено",
    lesson_already_completed: "Урок уже завершено",

    course_title_required: "Назва курсу не може бути порожньою",
    simulation_title_required: "Назва симуляції не може бути порожньою",
    section_title_required: "Назва розділу не може бути порожньою",
    section_needs_lesson: "Додайте уроки до цього розділу",
    course_needs_lesson: "Додайте хоча б один урок до курсу",
    simulation_needs_step: "Додайте хоча б один крок до симуляції",
    lesson_title_required: "Вкажіть назву уроку",
    lesson_video_required: "Завантажте відео для уроку",
    lesson_document_required: "Завантажте документ для уроку",
    lesson_content_empty: "Вміст уроку не може бути порожнім",
    test_not_saved: "Тест не було збережено",
    step_title_required: "Вкажіть назву кроку",
    step_content_required: "Вкажіть опис кроку",
    step_video_required: "Завантажте відео для кроку",
    question_text_required: "Введіть текст питання",
    option_text_required: "Заповніть усі варіанти відповіді",

    image_upload_failed: "Сталася помилка при завантаженні зображення",
    file_upload_failed: "Сталася помилка при завантаженні файлу",
    not_image: "Дозволені лише файли зображень",
    not_video: "Файл повинен бути у відео форматі",
    unsupported_document: "Несумісний формат файлу",
    file_too_large: "Розмір файлу перевищує максимально допустимий розмір",

    keyword_empty: "Ключове слово не може бути порожнім",
    keyword_single_word: "Введіть лише одне слово без пробілів",
    keyword_duplicate: "Таке ключове слово вже додано",
};

static EN: Messages = Messages {
    not_authorized: "Not authorized",
    not_enough_rights: "Not enough rights",
    internal_error: "Something went wrong",
    invalid_request: "Invalid request",

    course_not_found: "Course not found",
    simulation_not_found: "Simulation not found",
    lesson_not_found: "Lesson not found",
    lesson_id_required: "Lesson id is required",
    file_required: "File is required",

    course_already_exists: "A course with this title already exists",
    simulation_already_exists: "A simulation with this title already exists",
    course_progress_error: "Failed to update course progress",
    upload_error: "File upload failed",
    lesson_completed: "Lesson completed",
    lesson_already_completed: "Lesson already completed",

    course_title_required: "Course title cannot be empty",
    simulation_title_required: "Simulation title cannot be empty",
    section_title_required: "Section title cannot be empty",
    section_needs_lesson: "Add lessons to this section",
    course_needs_lesson: "Add at least one lesson to the course",
    simulation_needs_step: "Add at least one step to the simulation",
    lesson_title_required: "Enter the lesson title",
    lesson_video_required: "Upload a video for the lesson",
    lesson_document_required: "Upload a document for the lesson",
    lesson_content_empty: "Lesson content cannot be empty",
    test_not_saved: "The test has not been saved",
    step_title_required: "Enter the step title",
    step_content_required: "Enter the step description",
    step_video_required: "Upload a video for the step",
    question_text_required: "Enter the question text",
    option_text_required: "Fill in every answer option",

    image_upload_failed: "Failed to upload the image",
    file_upload_failed: "Failed to upload the file",
    not_image: "Only image files are allowed",
    not_video: "The file must be a video",
    unsupported_document: "Unsupported file format",
    file_too_large: "The file exceeds the maximum allowed size",

    keyword_empty: "Keyword cannot be empty",
    keyword_single_word: "Enter a single word without spaces",
    keyword_duplicate: "This keyword has already been added",
};
