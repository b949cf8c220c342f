use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a stored or submitted enum value is not one we know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Content type of a lesson.
///
/// `videoUrl` / `documentUrl` are only meaningful for `Video` / `Document`,
/// and the structured quiz only for `Test`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    #[default]
    Text,
    Video,
    Document,
    Test,
}

impl LessonType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Video => "VIDEO",
            Self::Document => "DOCUMENT",
            Self::Test => "TEST",
        }
    }

    /// Whether this lesson type carries an uploaded file.
    pub const fn has_file(self) -> bool {
        matches!(self, Self::Video | Self::Document)
    }
}

impl fmt::Display for LessonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonType {
    type Err = UnknownVariant;

    // Accepts any casing, the way the create endpoint historically upper-cased input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(Self::Text),
            "VIDEO" => Ok(Self::Video),
            "DOCUMENT" => Ok(Self::Document),
            "TEST" => Ok(Self::Test),
            _ => Err(UnknownVariant {
                kind: "lesson type",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LessonType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Status of a user's progress through a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    #[default]
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(UnknownVariant {
                kind: "progress status",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ProgressStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_type_parsing_is_case_insensitive() {
        assert_eq!("video".parse::<LessonType>(), Ok(LessonType::Video));
        assert_eq!("TEST".parse::<LessonType>(), Ok(LessonType::Test));
        assert!("audio".parse::<LessonType>().is_err());
    }

    #[test]
    fn test_lesson_type_serde_uses_upper_case() {
        let json = serde_json::to_string(&LessonType::Document).unwrap();
        assert_eq!(json, "\"DOCUMENT\"");
        let back: LessonType = serde_json::from_str("\"TEXT\"").unwrap();
        assert_eq!(back, LessonType::Text);
    }

    #[test]
    fn test_progress_status_round_trips_through_str() {
        for status in [ProgressStatus::InProgress, ProgressStatus::Completed] {
            assert_eq!(status.as_str().parse::<ProgressStatus>(), Ok(status));
        }
        assert!("DONE".parse::<ProgressStatus>().is_err());
    }

    #[test]
    fn test_only_video_and_document_carry_files() {
        assert!(LessonType::Video.has_file());
        assert!(LessonType::Document.has_file());
        assert!(!LessonType::Text.has_file());
        assert!(!LessonType::Test.has_file());
    }
}
