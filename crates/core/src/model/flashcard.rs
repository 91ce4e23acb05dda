use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlashcardError {
    #[error("flashcard front must not be empty")]
    EmptyFront,
    #[error("flashcard back must not be empty")]
    EmptyBack,
}

/// A term/definition pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    front: String,
    back: String,
}

impl Flashcard {
    /// # Errors
    ///
    /// Returns `FlashcardError` if either side is blank after trimming.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Result<Self, FlashcardError> {
        let front = front.into().trim().to_owned();
        let back = back.into().trim().to_owned();
        if front.is_empty() {
            return Err(FlashcardError::EmptyFront);
        }
        if back.is_empty() {
            return Err(FlashcardError::EmptyBack);
        }
        Ok(Self { front, back })
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }
}
