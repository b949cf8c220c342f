//! Per-field error map of the authoring form.
//!
//! Keys are positional (they name the section, lesson or step by its current
//! index), so every structural edit of the draft has a matching remap here.
//! The remaps are pure functions over the key space.

use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Which field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Title,
    Image,
    /// Course-level "add at least one lesson".
    Course,
    /// Simulation-level "add at least one step".
    Simulation,
    Section(usize),
    SectionLessons(usize),
    LessonTitle { section: usize, lesson: usize },
    LessonContent { section: usize, lesson: usize },
    StepTitle(usize),
    StepContent(usize),
    StepVideo(usize),
}

impl ErrorKey {
    /// Re-index the section part of the key. Keys without a section are kept;
    /// `None` from `f` drops the key.
    fn map_section(self, f: impl Fn(usize) -> Option<usize>) -> Option<Self> {
        Some(match self {
            Self::Section(s) => Self::Section(f(s)?),
            Self::SectionLessons(s) => Self::SectionLessons(f(s)?),
            Self::LessonTitle { section, lesson } => Self::LessonTitle {
                section: f(section)?,
                lesson,
            },
            Self::LessonContent { section, lesson } => Self::LessonContent {
                section: f(section)?,
                lesson,
            },
            other => other,
        })
    }

    fn map_lesson(self, in_section: usize, f: impl Fn(usize) -> Option<usize>) -> Option<Self> {
        Some(match self {
            Self::LessonTitle { section, lesson } if section == in_section => Self::LessonTitle {
                section,
                lesson: f(lesson)?,
            },
            Self::LessonContent { section, lesson } if section == in_section => Self::LessonContent {
                section,
                lesson: f(lesson)?,
            },
            other => other,
        })
    }

    fn map_step(self, f: impl Fn(usize) -> Option<usize>) -> Option<Self> {
        Some(match self {
            Self::StepTitle(i) => Self::StepTitle(f(i)?),
            Self::StepContent(i) => Self::StepContent(f(i)?),
            Self::StepVideo(i) => Self::StepVideo(f(i)?),
            other => other,
        })
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Image => f.write_str("image"),
            Self::Course => f.write_str("course"),
            Self::Simulation => f.write_str("simulation"),
            Self::Section(s) => write!(f, "section-{s}"),
            Self::SectionLessons(s) => write!(f, "section-lessons-{s}"),
            Self::LessonTitle { section, lesson } => write!(f, "lesson-{section}-{lesson}"),
            Self::LessonContent { section, lesson } => write!(f, "content-{section}-{lesson}"),
            Self::StepTitle(i) => write!(f, "step-title-{i}"),
            Self::StepContent(i) => write!(f, "step-content-{i}"),
            Self::StepVideo(i) => write!(f, "step-videoUrl-{i}"),
        }
    }
}

/// Index after removing the element at `removed`.
fn after_remove(removed: usize) -> impl Fn(usize) -> Option<usize> {
    move |i| match i.cmp(&removed) {
        std::cmp::Ordering::Less => Some(i),
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Greater => Some(i - 1),
    }
}

/// Index after moving the element at `from` so that it ends up at `to`.
///
/// For `to == from ± 1` this is a swap of the two positions.
fn after_move(from: usize, to: usize) -> impl Fn(usize) -> Option<usize> {
    move |i| {
        Some(if i == from {
            to
        } else if from < to && i > from && i <= to {
            i - 1
        } else if to < from && i >= to && i < from {
            i + 1
        } else {
            i
        })
    }
}

/// Sparse map from field to message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<ErrorKey, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ErrorKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }

    pub fn remove(&mut self, key: ErrorKey) -> Option<String> {
        self.0.remove(&key)
    }

    pub fn get(&self, key: ErrorKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: ErrorKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = ErrorKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn remap(&mut self, f: impl Fn(ErrorKey) -> Option<ErrorKey>) {
        let old = std::mem::take(&mut self.0);
        self.0 = old.into_iter().filter_map(|(k, v)| Some((f(k)?, v))).collect();
    }

    /// Section `idx` was removed: its keys go, later sections shift down.
    pub fn remove_section(&mut self, idx: usize) {
        self.remap(|k| k.map_section(after_remove(idx)));
    }

    pub fn move_section(&mut self, from: usize, to: usize) {
        self.remap(|k| k.map_section(after_move(from, to)));
    }

    pub fn remove_lesson(&mut self, section: usize, idx: usize) {
        self.remap(|k| k.map_lesson(section, after_remove(idx)));
    }

    pub fn move_lesson(&mut self, section: usize, from: usize, to: usize) {
        self.remap(|k| k.map_lesson(section, after_move(from, to)));
    }

    pub fn remove_step(&mut self, idx: usize) {
        self.remap(|k| k.map_step(after_remove(idx)));
    }

    pub fn move_step(&mut self, from: usize, to: usize) {
        self.remap(|k| k.map_step(after_move(from, to)));
    }
}

// Serialized with the string keys the UI binds to (`lesson-2-1`, ...).
impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, message) in &self.0 {
            map.serialize_entry(&key.to_string(), message)?;
        }
        map.end()
    }
}
