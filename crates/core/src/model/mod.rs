mod email;
mod flashcard;
mod ids;
mod lesson;
mod question;
mod user;

pub use email::{Email, EmailError};
pub use flashcard::{Flashcard, FlashcardError};
pub use ids::{ParseIdError, UserId};
pub use lesson::{LessonContent, PREVIEW_CHARS};
pub use question::{OPTION_COUNT, OPTION_LABELS, QuestionError, QuestionRecord};
pub use user::User;
