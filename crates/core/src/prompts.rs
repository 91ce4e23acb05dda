//! Instruction templates sent to the text generator.

use crate::quiz::QUIZ_LENGTH;

#[must_use]
pub fn summary_prompt(content: &str) -> String {
    format!("Create 5 bullet point summary from this content:\n\n{content}")
}

/// The reply format here is what `quiz::parse_quiz` understands.
#[must_use]
pub fn quiz_prompt(content: &str) -> String {
    format!(
        "Create {QUIZ_LENGTH} multiple choice questions with 4 options each based on the content. \
         Format as: Q: question\nA) option1\nB) option2\nC) option3\nD) option4\nCorrect: A\n\
         Repeat for each question.\n\n{content}"
    )
}

#[must_use]
pub fn flashcards_prompt(content: &str) -> String {
    format!(
        "Create 10 flashcards from the content. Format as: Term: ...\nDefinition: ...\n\n{content}"
    )
}

#[must_use]
pub fn answer_prompt(content: &str, question: &str) -> String {
    format!("Content: {content}\n\nStudent Question: {question}\n\nAnswer:")
}

/// Stand-in answer when no generated answer is available.
#[must_use]
pub fn placeholder_answer(question: &str) -> String {
    format!("Mock answer: This is a simulated response for '{question}'.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_prompt_carries_format_and_content() {
        let prompt = quiz_prompt("Photosynthesis converts light.");
        assert!(prompt.starts_with("Create 15 multiple choice questions"));
        assert!(prompt.contains("Correct: A"));
        assert!(prompt.ends_with("Photosynthesis converts light."));
    }

    #[test]
    fn answer_prompt_orders_sections() {
        let prompt = answer_prompt("ctx", "why?");
        assert_eq!(prompt, "Content: ctx\n\nStudent Question: why?\n\nAnswer:");
    }
}
