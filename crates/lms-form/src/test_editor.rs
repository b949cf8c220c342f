//! Editor for the quiz of a TEST lesson.
//!
//! Works on its own copy of the questions; the lesson only sees the quiz once
//! [`TestEditor::validate_and_save`] succeeds.

use std::{collections::BTreeMap, fmt};

use lms_core::{Question, QuestionType, Test, TestOption, i18n::Lang};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestErrorKey {
    Question(usize),
    Options(usize),
}

impl fmt::Display for TestErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question(i) => write!(f, "question-{i}"),
            Self::Options(i) => write!(f, "option-{i}"),
        }
    }
}

/// A single-field edit of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionUpdate {
    Text(String),
    Type(QuestionType),
}

/// A single-field edit of an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionUpdate {
    Text(String),
    Correct(bool),
}

#[derive(Debug, Clone)]
pub struct TestEditor {
    lang: Lang,
    questions: Vec<Question>,
    active: usize,
    errors: BTreeMap<TestErrorKey, String>,
    // Errors are recomputed on every edit once a save has been attempted.
    show_errors: bool,
}

impl TestEditor {
    /// Start editing `initial`, or a one-question quiz when there is none.
    pub fn new(lang: Lang, initial: Option<&Test>) -> Self {
        let questions = match initial {
            Some(test) if !test.is_empty() => test.questions.clone(),
            _ => Test::starter().questions,
        };
        Self {
            lang,
            questions,
            active: 0,
            errors: BTreeMap::new(),
            show_errors: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn active_question(&self) -> usize {
        self.active
    }

    pub fn errors(&self) -> &BTreeMap<TestErrorKey, String> {
        &self.errors
    }

    pub fn test(&self) -> Test {
        Test {
            questions: self.questions.clone(),
        }
    }

    pub fn set_active(&mut self, index: usize) {
        if index < self.questions.len() {
            self.active = index;
            self.refresh_errors();
        }
    }

    /// New questions take the type of the first question.
    pub fn add_question(&mut self) {
        let kind = self.questions.first().map(|q| q.kind).unwrap_or_default();
        self.questions.push(Question::empty(kind));
        self.active = self.questions.len() - 1;
    }

    /// Removing the last question leaves a fresh empty one in its place.
    pub fn remove_question(&mut self, index: usize) {
        if index >= self.questions.len() {
            return;
        }
        self.questions.remove(index);
        if self.questions.is_empty() {
            self.questions.push(Question::empty(QuestionType::Single));
        }
        self.active = self.active.min(self.questions.len() - 1);
        self.refresh_errors();
    }

    pub fn update_question(&mut self, index: usize, update: QuestionUpdate) {
        let Some(question) = self.questions.get_mut(index) else {
            return;
        };

        match update {
            QuestionUpdate::Text(text) => question.question = text,
            QuestionUpdate::Type(kind) => {
                question.kind = kind;
                match kind {
                    QuestionType::Multiple => {
                        for (i, option) in question.options.iter_mut().enumerate() {
                            option.is_correct = i < 2;
                        }
                    }
                    QuestionType::Single => {
                        let keep = question.first_correct().unwrap_or(0);
                        for (i, option) in question.options.iter_mut().enumerate() {
                            option.is_correct = i == keep;
                        }
                    }
                }
            }
        }
        self.refresh_errors();
    }

    pub fn add_option(&mut self, question: usize) {
        if let Some(q) = self.questions.get_mut(question) {
            q.options.push(TestOption::new(false));
        }
    }

    /// A question keeps at least two options. Removing the correct option of
    /// a SINGLE question makes the first option correct; removing a correct
    /// option that would leave a MULTIPLE question with fewer than two correct
    /// options marks the first unmarked option correct.
    pub fn remove_option(&mut self, question: usize, option: usize) {
        let Some(q) = self.questions.get_mut(question) else {
            return;
        };
        if q.options.len() <= 2 || option >= q.options.len() {
            return;
        }

        let removed = q.options.remove(option);
        if removed.is_correct {
            match q.kind {
                QuestionType::Single => q.options[0].is_correct = true,
                QuestionType::Multiple if q.correct_count() < 2 => {
                    if let Some(next) = q.options.iter_mut().find(|o| !o.is_correct) {
                        next.is_correct = true;
                    }
                }
                QuestionType::Multiple => {}
            }
        }
        self.refresh_errors();
    }

    /// Edit an option.
    ///
    /// Correctness edits keep the question valid: a SINGLE question always
    /// has exactly one correct option (checking one unchecks the rest,
    /// unchecking it is ignored) and a MULTIPLE question never drops below
    /// two correct options.
    pub fn update_option(&mut self, question: usize, option: usize, update: OptionUpdate) {
        let Some(q) = self.questions.get_mut(question) else {
            return;
        };
        if option >= q.options.len() {
            return;
        }

        match update {
            OptionUpdate::Text(text) => q.options[option].text = text,
            OptionUpdate::Correct(true) => {
                if q.kind == QuestionType::Single {
                    for (i, o) in q.options.iter_mut().enumerate() {
                        o.is_correct = i == option;
                    }
                } else {
                    q.options[option].is_correct = true;
                }
            }
            OptionUpdate::Correct(false) => {
                if !q.options[option].is_correct {
                    return;
                }
                let blocked = match q.kind {
                    QuestionType::Single => true,
                    QuestionType::Multiple => q.correct_count() <= 2,
                };
                if blocked {
                    return;
                }
                q.options[option].is_correct = false;
            }
        }
        self.refresh_errors();
    }

    pub fn move_question_up(&mut self, index: usize) {
        if index == 0 || index >= self.questions.len() {
            return;
        }
        self.questions.swap(index, index - 1);
        self.active = index - 1;
    }

    pub fn move_question_down(&mut self, index: usize) {
        if index + 1 >= self.questions.len() {
            return;
        }
        self.questions.swap(index, index + 1);
        self.active = index + 1;
    }

    /// Whether the save button should be enabled.
    pub fn can_save(&self) -> bool {
        !self.questions.is_empty()
            && self.questions.iter().all(|q| {
                !q.question.trim().is_empty()
                    && q.options.len() >= 2
                    && q.options.iter().all(|o| !o.text.trim().is_empty())
                    && q.options.iter().any(|o| o.is_correct)
            })
    }

    /// Validate every question. On success the errors are cleared and the
    /// quiz is returned; otherwise errors stay visible and follow later edits.
    pub fn validate_and_save(&mut self) -> Option<Test> {
        let errors = self.validate();
        if errors.is_empty() {
            self.show_errors = false;
            self.errors.clear();
            Some(self.test())
        } else {
            self.show_errors = true;
            self.errors = errors;
            None
        }
    }

    fn validate(&self) -> BTreeMap<TestErrorKey, String> {
        let messages = self.lang.messages();
        let mut errors = BTreeMap::new();
        for (i, q) in self.questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                errors.insert(TestErrorKey::Question(i), messages.question_text_required.to_string());
            }
            if q.options.iter().any(|o| o.text.trim().is_empty()) {
                errors.insert(TestErrorKey::Options(i), messages.option_text_required.to_string());
            }
        }
        errors
    }

    fn refresh_errors(&mut self) {
        if self.show_errors {
            self.errors = self.validate();
        }
    }
}
