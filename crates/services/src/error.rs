//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::EmailError;
use storage::repository::StorageError;

/// Errors emitted by `TextGenerator` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("text generation is not configured")]
    Disabled,
    #[error("text generation returned an empty response")]
    EmptyResponse,
    #[error("text generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid authentication credentials")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid token or email")]
    InvalidResetToken,
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while pulling text out of an upload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("Unsupported file type. Please upload PDF, PPTX, DOCX, or text files.")]
    UnsupportedType(String),
    #[error("Failed to parse PDF file.")]
    Pdf(String),
    #[error("Failed to parse DOCX file.")]
    Docx(String),
    #[error("Failed to parse PPTX file.")]
    Pptx(String),
    #[error("Failed to decode text file.")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors emitted while rendering exports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("failed to write slide deck: {0}")]
    Pptx(#[from] zip::result::ZipError),
    #[error("failed to write pdf: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("No content uploaded. Please upload a file first.")]
    NoContent,
    #[error("Question is required")]
    EmptyQuestion,
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
