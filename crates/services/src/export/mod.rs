//! Slide-deck and PDF exports of a lesson's summary and quiz.

pub mod pdf;
pub mod pptx;

use lesson_core::model::OPTION_LABELS;
use lesson_core::quiz::QuizResult;
use lesson_core::summary::Summary;

pub use pdf::render_pdf;
pub use pptx::render_pptx;

pub const DOCUMENT_TITLE: &str = "AI Lesson Converter";
pub const DOCUMENT_SUBTITLE: &str = "Generated Lesson Summary & Quiz";
pub const SUMMARY_HEADING: &str = "Lesson Summary";
pub const QUIZ_HEADING: &str = "Quiz Questions";

/// `1. point` lines for the summary section.
pub(crate) fn summary_lines(summary: &Summary) -> Vec<String> {
    summary
        .points()
        .iter()
        .enumerate()
        .map(|(idx, point)| format!("{}. {point}", idx + 1))
        .collect()
}

/// One question rendered as its heading, lettered options and answer line.
pub(crate) struct QuestionLines {
    pub heading: String,
    pub options: Vec<String>,
    pub answer: String,
}

pub(crate) fn quiz_lines(quiz: &QuizResult) -> Vec<QuestionLines> {
    quiz.iter()
        .enumerate()
        .map(|(idx, record)| QuestionLines {
            heading: format!("Q{}: {}", idx + 1, record.question()),
            options: record
                .options()
                .iter()
                .zip(OPTION_LABELS)
                .map(|(option, label)| format!("{label}) {option}"))
                .collect(),
            answer: format!("Correct: {}", record.correct_answer()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::quiz::parse_quiz;
    use lesson_core::summary::parse_summary;

    #[test]
    fn numbers_summary_points() {
        let lines = summary_lines(&parse_summary(Some("- a\n- b")));
        assert_eq!(lines, ["1. a", "2. b"]);
    }

    #[test]
    fn letters_quiz_options() {
        let lines = quiz_lines(&parse_quiz(None));
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[0].heading, "Q1: Generated Question 1");
        assert_eq!(lines[0].options[3], "D) Answer D");
        assert_eq!(lines[0].answer, "Correct: Answer B");
    }
}
