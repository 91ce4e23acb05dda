use crate::model::{OPTION_COUNT, OPTION_LABELS, QuestionRecord};

/// Deterministic stand-in for the question at 1-based `position`.
///
/// The correct answer is `options[position % 4]`, so the record is fully
/// determined by its position.
#[must_use]
pub fn placeholder_question(position: usize) -> QuestionRecord {
    let options: [String; OPTION_COUNT] = OPTION_LABELS.map(|label| format!("Answer {label}"));
    QuestionRecord::from_parts(format!("Generated Question {position}"), options, position)
}
