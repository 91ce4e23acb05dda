use chrono::{DateTime, Utc};

/// Number of characters echoed back to the client after an upload.
pub const PREVIEW_CHARS: usize = 500;

/// Text extracted from the most recent upload of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonContent {
    text: String,
    media_type: String,
    uploaded_at: DateTime<Utc>,
}

impl LessonContent {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        media_type: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            text: text.into(),
            media_type: media_type.into(),
            uploaded_at,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    #[must_use]
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// First `PREVIEW_CHARS` characters, suffixed with `...` when truncated.
    #[must_use]
    pub fn preview(&self) -> String {
        match self.text.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &self.text[..cut]),
            None => self.text.clone(),
        }
    }
}
