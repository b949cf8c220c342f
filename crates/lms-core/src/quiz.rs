//! Quiz ("test") lessons: structure and answer scoring.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a question accepts one answer or several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    #[default]
    Single,
    Multiple,
}

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl TestOption {
    pub fn new(is_correct: bool) -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            is_correct,
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<TestOption>,
}

impl Question {
    /// Creates an empty question with two blank options.
    ///
    /// A SINGLE question starts with the first option correct; a MULTIPLE
    /// question starts with both correct so it already satisfies the
    /// two-correct-options rule.
    pub fn empty(kind: QuestionType) -> Self {
        let options = match kind {
            QuestionType::Single => vec![TestOption::new(true), TestOption::new(false)],
            QuestionType::Multiple => vec![TestOption::new(true), TestOption::new(true)],
        };
        Self {
            id: new_id(),
            question: String::new(),
            kind,
            options,
        }
    }

    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// Index of the first correct option, if any.
    pub fn first_correct(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }
}

/// The quiz attached to a TEST lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub questions: Vec<Question>,
}

impl Test {
    /// A fresh quiz with one empty SINGLE question.
    pub fn starter() -> Self {
        Self {
            questions: vec![Question::empty(QuestionType::Single)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Outcome of answering a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Correct,
    Partial,
    Wrong,
}

/// Grade the user's selection for one question.
///
/// `selected` holds option ids. Returns `None` when nothing is selected.
///
/// * SINGLE: only the first selected option is considered.
/// * MULTIPLE: `Correct` when the selected set equals the set of correct
///   options, `Partial` when it merely intersects it, `Wrong` otherwise.
pub fn answer_status(question: &Question, selected: &[String]) -> Option<AnswerStatus> {
    let first = selected.first()?;

    match question.kind {
        QuestionType::Single => {
            let hit = question
                .options
                .iter()
                .any(|o| o.is_correct && &o.id == first);
            Some(if hit {
                AnswerStatus::Correct
            } else {
                AnswerStatus::Wrong
            })
        }
        QuestionType::Multiple => {
            let correct: BTreeSet<&str> = question
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id.as_str())
                .collect();
            let chosen: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

            if chosen == correct {
                Some(AnswerStatus::Correct)
            } else if chosen.intersection(&correct).next().is_some() {
                Some(AnswerStatus::Partial)
            } else {
                Some(AnswerStatus::Wrong)
            }
        }
    }
}

/// Aggregate of a graded quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub total: usize,
    pub correct: usize,
    pub partial: usize,
}

/// Grade every question of `test`; `answers[i]` is the selection for question `i`.
///
/// Missing or empty selections count towards `total` only.
pub fn score_test(test: &Test, answers: &[Vec<String>]) -> TestResult {
    let mut result = TestResult {
        total: test.questions.len(),
        ..TestResult::default()
    };

    for (i, question) in test.questions.iter().enumerate() {
        let selected = answers.get(i).map(Vec::as_slice).unwrap_or_default();
        match answer_status(question, selected) {
            Some(AnswerStatus::Correct) => result.correct += 1,
            Some(AnswerStatus::Partial) => result.partial += 1,
            _ => {}
        }
    }

    result
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, text: &str, is_correct: bool) -> TestOption {
        TestOption {
            id: id.into(),
            text: text.into(),
            is_correct,
        }
    }

    fn capital_question() -> Question {
        Question {
            id: "q1".into(),
            question: "Capital of France?".into(),
            kind: QuestionType::Single,
            options: vec![option("a", "Paris", true), option("b", "Berlin", false)],
        }
    }

    fn multiple_question() -> Question {
        Question {
            id: "q2".into(),
            question: "Pick the primes".into(),
            kind: QuestionType::Multiple,
            options: vec![
                option("a", "2", true),
                option("b", "3", true),
                option("c", "4", false),
            ],
        }
    }

    fn sel(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection_has_no_status() {
        assert_eq!(answer_status(&capital_question(), &[]), None);
        assert_eq!(answer_status(&multiple_question(), &[]), None);
    }

    #[test]
    fn test_single_question_uses_first_selection() {
        let q = capital_question();
        assert_eq!(answer_status(&q, &sel(&["a"])), Some(AnswerStatus::Correct));
        assert_eq!(answer_status(&q, &sel(&["b"])), Some(AnswerStatus::Wrong));
        assert_eq!(answer_status(&q, &sel(&["b", "a"])), Some(AnswerStatus::Wrong));
    }

    #[test]
    fn test_multiple_question_requires_exact_set() {
        let q = multiple_question();
        assert_eq!(answer_status(&q, &sel(&["b", "a"])), Some(AnswerStatus::Correct));
        assert_eq!(answer_status(&q, &sel(&["a"])), Some(AnswerStatus::Partial));
        assert_eq!(answer_status(&q, &sel(&["a", "b", "c"])), Some(AnswerStatus::Partial));
        assert_eq!(answer_status(&q, &sel(&["c"])), Some(AnswerStatus::Wrong));
    }

    #[test]
    fn test_score_test_counts_outcomes() {
        let test = Test {
            questions: vec![capital_question(), multiple_question(), capital_question()],
        };
        let result = score_test(&test, &[sel(&["a"]), sel(&["a"])]);
        assert_eq!(
            result,
            TestResult {
                total: 3,
                correct: 1,
                partial: 1
            }
        );
    }

    #[test]
    fn test_empty_questions_satisfy_correctness_rules() {
        let single = Question::empty(QuestionType::Single);
        assert_eq!(single.correct_count(), 1);
        assert_eq!(single.first_correct(), Some(0));

        let multiple = Question::empty(QuestionType::Multiple);
        assert_eq!(multiple.correct_count(), 2);
        assert_ne!(multiple.options[0].id, multiple.options[1].id);
    }

    #[test]
    fn test_question_serializes_kind_as_type() {
        let value = serde_json::to_value(capital_question()).unwrap();
        assert_eq!(value["type"], "SINGLE");
        assert_eq!(value["options"][0]["is_correct"], true);
    }
}
