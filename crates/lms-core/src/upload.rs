//! Rules for uploaded files: accepted MIME types, size limits and the
//! object-store key layout.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::UnknownVariant;

const MB: u64 = 1024 * 1024;

/// MIME types accepted for DOCUMENT lessons. Entries ending in `/` match by prefix.
const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/",
    "text/plain",
];

/// Extensions accepted for documents regardless of the reported MIME type.
const DOCUMENT_EXTENSIONS: &[&str] = &[".txt", ".doc", ".docx"];

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\d._-]+").unwrap());

/// Object-store namespace of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Images,
    Videos,
    Documents,
}

impl UploadKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Documents => "documents",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "images" => Ok(Self::Images),
            "videos" => Ok(Self::Videos),
            "documents" => Ok(Self::Documents),
            _ => Err(UnknownVariant {
                kind: "upload kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Where a file is going to be attached; each target has its own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRule {
    /// Course or simulation cover: `image/*`, 10 MB.
    CoverImage,
    /// VIDEO lesson: `video/*`, 200 MB.
    LessonVideo,
    /// DOCUMENT lesson: office formats, images or plain text, 50 MB.
    Document,
    /// Simulation step: `video/*`, 50 MB.
    StepVideo,
}

impl FileRule {
    pub const fn max_bytes(self) -> u64 {
        self.max_mb() * MB
    }

    pub const fn max_mb(self) -> u64 {
        match self {
            Self::CoverImage => 10,
            Self::LessonVideo => 200,
            Self::Document | Self::StepVideo => 50,
        }
    }

    pub const fn kind(self) -> UploadKind {
        match self {
            Self::CoverImage => UploadKind::Images,
            Self::LessonVideo | Self::StepVideo => UploadKind::Videos,
            Self::Document => UploadKind::Documents,
        }
    }

    /// The most permissive rule for a storage namespace, used by the upload endpoint.
    pub const fn for_kind(kind: UploadKind) -> Self {
        match kind {
            UploadKind::Images => Self::CoverImage,
            UploadKind::Videos => Self::LessonVideo,
            UploadKind::Documents => Self::Document,
        }
    }

    /// Check a file against this rule. Type is checked before size.
    pub fn check(self, file_name: &str, content_type: &str, size: u64) -> Result<(), UploadRuleError> {
        let type_ok = match self {
            Self::CoverImage => content_type.starts_with("image/"),
            Self::LessonVideo | Self::StepVideo => content_type.starts_with("video/"),
            Self::Document => is_allowed_document(file_name, content_type),
        };
        if !type_ok {
            return Err(match self {
                Self::CoverImage => UploadRuleError::NotImage,
                Self::LessonVideo | Self::StepVideo => UploadRuleError::NotVideo,
                Self::Document => UploadRuleError::UnsupportedDocument,
            });
        }

        if size > self.max_bytes() {
            return Err(UploadRuleError::TooLarge {
                limit_mb: self.max_mb(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRuleError {
    #[error("only image files are allowed")]
    NotImage,
    #[error("file must be a video")]
    NotVideo,
    #[error("unsupported document format")]
    UnsupportedDocument,
    #[error("file exceeds the maximum size of {limit_mb}MB")]
    TooLarge { limit_mb: u64 },
}

pub fn is_allowed_document(file_name: &str, content_type: &str) -> bool {
    let by_type = DOCUMENT_TYPES.iter().any(|allowed| {
        if allowed.ends_with('/') {
            content_type.starts_with(allowed)
        } else {
            content_type == *allowed
        }
    });
    by_type || DOCUMENT_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext))
}

/// Replace every run of characters other than letters, digits, `.`, `_`
/// and `-` with a single `_`.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// Build the storage key `{kind}/{prefix}-{sanitized name}`.
///
/// `prefix` is the caller's random tag (8 hex chars in production) that keeps
/// re-uploads of the same file name from colliding.
pub fn object_key(kind: UploadKind, prefix: &str, file_name: &str) -> String {
    format!("{}/{}-{}", kind, prefix, sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_image_rules() {
        assert_eq!(FileRule::CoverImage.check("a.png", "image/png", 10 * MB), Ok(()));
        assert_eq!(
            FileRule::CoverImage.check("a.png", "image/png", 10 * MB + 1),
            Err(UploadRuleError::TooLarge { limit_mb: 10 })
        );
        assert_eq!(
            FileRule::CoverImage.check("a.pdf", "application/pdf", 1),
            Err(UploadRuleError::NotImage)
        );
    }

    #[test]
    fn test_video_limits_differ_for_lessons_and_steps() {
        let size = 100 * MB;
        assert_eq!(FileRule::LessonVideo.check("v.mp4", "video/mp4", size), Ok(()));
        assert_eq!(
            FileRule::StepVideo.check("v.mp4", "video/mp4", size),
            Err(UploadRuleError::TooLarge { limit_mb: 50 })
        );
        assert_eq!(
            FileRule::StepVideo.check("v.mp3", "audio/mpeg", 1),
            Err(UploadRuleError::NotVideo)
        );
    }

    #[test]
    fn test_document_accepts_listed_types_and_extensions() {
        assert!(is_allowed_document("x.pdf", "application/pdf"));
        assert!(is_allowed_document("scan.jpg", "image/jpeg"));
        assert!(is_allowed_document("notes.txt", ""));
        assert!(is_allowed_document("old.doc", "application/octet-stream"));
        assert!(!is_allowed_document("tool.exe", "application/x-msdownload"));
        assert_eq!(
            FileRule::Document.check("tool.exe", "application/x-msdownload", 1),
            Err(UploadRuleError::UnsupportedDocument)
        );
    }

    #[test]
    fn test_sanitize_file_name_keeps_letters_of_any_script() {
        assert_eq!(sanitize_file_name("Лекція 1 (final).pdf"), "Лекція_1_final_.pdf");
        assert_eq!(sanitize_file_name("a  b?.mp4"), "a_b_.mp4");
    }

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key(UploadKind::Videos, "0a1b2c3d", "intro clip.mp4"),
            "videos/0a1b2c3d-intro_clip.mp4"
        );
    }

    #[test]
    fn test_upload_kind_parsing() {
        assert_eq!("documents".parse::<UploadKind>(), Ok(UploadKind::Documents));
        assert!("other".parse::<UploadKind>().is_err());
        assert_eq!(FileRule::for_kind(UploadKind::Videos), FileRule::LessonVideo);
    }
}
