//! Domain core for the medical courses platform.
//!
//! This crate holds everything that both the HTTP service and the authoring
//! form engine need to agree on, without any I/O: lesson and quiz types,
//! slug and keyword rules, progress arithmetic, upload rules and the JSON
//! payloads exchanged on submit.

pub mod content;
pub mod i18n;
pub mod keywords;
pub mod payload;
pub mod progress;
pub mod quiz;
pub mod slug;
pub mod upload;

pub use content::{LessonType, ProgressStatus, UnknownVariant};
pub use i18n::{Lang, Messages};
pub use keywords::KeywordError;
pub use quiz::{AnswerStatus, Question, QuestionType, Test, TestOption, TestResult};
pub use upload::{UploadKind, UploadRuleError};
