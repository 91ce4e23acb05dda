#![forbid(unsafe_code)]

pub mod auth_service;
pub mod error;
pub mod export;
pub mod extraction;
pub mod generation;
pub mod lesson_service;
pub mod password;

pub use lesson_core::Clock;

pub use auth_service::{AccessToken, AuthConfig, AuthService, AuthenticatedUser};
pub use error::{AuthError, ExportError, ExtractionError, GenerationError, LessonError};
pub use generation::{GenerationConfig, GenerationService, TextGenerator};
pub use lesson_service::{LessonService, UploadPreview};
