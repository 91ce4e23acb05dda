use serde::Serialize;
use thiserror::Error;

/// Every quiz question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Option labels in index order.
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question text must not be empty")]
    EmptyQuestion,
    #[error("expected {OPTION_COUNT} options, found {0}")]
    OptionCount(usize),
    #[error("correct answer index {0} is out of range")]
    AnswerOutOfRange(usize),
    #[error("correct answer must not be empty")]
    EmptyAnswer,
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// A validated multiple choice question.
///
/// Invariant: exactly `OPTION_COUNT` options and `correct_answer` equal to one
/// of them. The answer is stored as option text, not as a letter, so consumers
/// may reorder options freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    question: String,
    options: [String; OPTION_COUNT],
    correct_answer: String,
}

impl QuestionRecord {
    /// Build a record from collected options and the index of the right one.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the question is blank, the option count is
    /// not `OPTION_COUNT`, or the answer index does not point at a non-empty
    /// option.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        answer_index: usize,
    ) -> Result<Self, QuestionError> {
        let question = question.into().trim().to_owned();
        if question.is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }

        let found = options.len();
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|_| QuestionError::OptionCount(found))?;
        let correct_answer = options
            .get(answer_index)
            .cloned()
            .ok_or(QuestionError::AnswerOutOfRange(answer_index))?;
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        Ok(Self {
            question,
            options,
            correct_answer,
        })
    }

    /// Infallible constructor for internally generated records.
    pub(crate) fn from_parts(
        question: String,
        options: [String; OPTION_COUNT],
        answer_index: usize,
    ) -> Self {
        let correct_answer = options[answer_index % OPTION_COUNT].clone();
        Self {
            question,
            options,
            correct_answer,
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Letter label of the correct option.
    #[must_use]
    pub fn correct_label(&self) -> char {
        self.options
            .iter()
            .position(|opt| *opt == self.correct_answer)
            .map_or(OPTION_LABELS[0], |idx| OPTION_LABELS[idx])
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
