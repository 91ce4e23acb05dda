use std::sync::Arc;

use lesson_core::flashcards::{FlashcardSet, parse_flashcards};
use lesson_core::model::{Email, LessonContent};
use lesson_core::prompts::{
    answer_prompt, flashcards_prompt, placeholder_answer, quiz_prompt, summary_prompt,
};
use lesson_core::quiz::{QuizResult, parse_quiz};
use lesson_core::summary::{Summary, parse_summary};
use storage::repository::ContentStore;

use crate::Clock;
use crate::error::{ExtractionError, LessonError};
use crate::export::{render_pdf, render_pptx};
use crate::extraction::extract_text;
use crate::generation::TextGenerator;

/// What the client sees after an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPreview {
    pub preview: String,
    pub total_chars: usize,
}

/// Per-user lesson workflow: upload once, then derive study material.
///
/// Everything except `upload` requires a prior upload by the same user and
/// fails with `LessonError::NoContent` otherwise. Generator failures never
/// surface here; they degrade to placeholder content.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    contents: Arc<dyn ContentStore>,
    generator: Arc<dyn TextGenerator>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        clock: Clock,
        contents: Arc<dyn ContentStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            clock,
            contents,
            generator,
        }
    }

    /// Extract text from an uploaded document and make it the user's
    /// current lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Extraction` for unsupported or unreadable files
    /// and `LessonError::Storage` if the content cannot be stored.
    pub async fn upload(
        &self,
        email: &Email,
        media_type: &str,
        data: &[u8],
    ) -> Result<UploadPreview, LessonError> {
        // Parsers are CPU-bound and may panic on malformed input.
        let text = tokio::task::spawn_blocking({
            let media_type = media_type.to_owned();
            let data = data.to_vec();
            move || extract_text(&media_type, &data)
        })
        .await
        .map_err(|err| ExtractionError::Pdf(err.to_string()))??;
        let content = LessonContent::new(text, media_type, self.clock.now());
        let preview = UploadPreview {
            preview: content.preview(),
            total_chars: content.text().chars().count(),
        };
        self.contents.put_content(email, content).await?;

        tracing::info!(%email, media_type, chars = preview.total_chars, "lesson uploaded");
        Ok(preview)
    }

    async fn current(&self, email: &Email) -> Result<LessonContent, LessonError> {
        self.contents
            .get_content(email)
            .await?
            .ok_or(LessonError::NoContent)
    }

    async fn summary_of(&self, content: &LessonContent) -> Summary {
        let reply = self.generator.generate_text(&summary_prompt(content.text())).await;
        let summary = parse_summary(reply.as_deref());
        if summary.is_synthetic() {
            tracing::info!("summary replaced with placeholder points");
        }
        summary
    }

    async fn quiz_of(&self, content: &LessonContent) -> QuizResult {
        let reply = self.generator.generate_text(&quiz_prompt(content.text())).await;
        let quiz = parse_quiz(reply.as_deref());
        if quiz.synthetic_count() > 0 {
            tracing::info!(
                synthetic = quiz.synthetic_count(),
                total = quiz.len(),
                "quiz padded with placeholder questions"
            );
        }
        quiz
    }

    /// # Errors
    ///
    /// Returns `LessonError::NoContent` when the user has not uploaded anything.
    pub async fn summarize(&self, email: &Email) -> Result<Summary, LessonError> {
        let content = self.current(email).await?;
        Ok(self.summary_of(&content).await)
    }

    /// Always yields exactly `QUIZ_LENGTH` questions.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NoContent` when the user has not uploaded anything.
    pub async fn generate_quiz(&self, email: &Email) -> Result<QuizResult, LessonError> {
        let content = self.current(email).await?;
        Ok(self.quiz_of(&content).await)
    }

    /// # Errors
    ///
    /// Returns `LessonError::NoContent` when the user has not uploaded anything.
    pub async fn generate_flashcards(&self, email: &Email) -> Result<FlashcardSet, LessonError> {
        let content = self.current(email).await?;
        let reply = self
            .generator
            .generate_text(&flashcards_prompt(content.text()))
            .await;
        let cards = parse_flashcards(reply.as_deref());
        if cards.synthetic_count() > 0 {
            tracing::info!(synthetic = cards.synthetic_count(), "flashcards padded");
        }
        Ok(cards)
    }

    /// Answer a free-form question about the current lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NoContent` when the user has not uploaded
    /// anything and `LessonError::EmptyQuestion` for a blank question.
    pub async fn ask(&self, email: &Email, question: &str) -> Result<String, LessonError> {
        let content = self.current(email).await?;
        let question = question.trim();
        if question.is_empty() {
            return Err(LessonError::EmptyQuestion);
        }

        let reply = self
            .generator
            .generate_text(&answer_prompt(content.text(), question))
            .await;
        Ok(match reply {
            Some(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            _ => placeholder_answer(question),
        })
    }

    /// # Errors
    ///
    /// Returns `LessonError::NoContent` without an upload and
    /// `LessonError::Export` if the deck cannot be written.
    pub async fn export_pptx(&self, email: &Email) -> Result<Vec<u8>, LessonError> {
        let content = self.current(email).await?;
        let summary = self.summary_of(&content).await;
        let quiz = self.quiz_of(&content).await;
        let deck = render_pptx(&summary, &quiz)?;
        tracing::info!(%email, bytes = deck.len(), "exported slide deck");
        Ok(deck)
    }

    /// # Errors
    ///
    /// Returns `LessonError::NoContent` without an upload and
    /// `LessonError::Export` if the document cannot be written.
    pub async fn export_pdf(&self, email: &Email) -> Result<Vec<u8>, LessonError> {
        let content = self.current(email).await?;
        let summary = self.summary_of(&content).await;
        let quiz = self.quiz_of(&content).await;
        let pdf = render_pdf(&summary, &quiz)?;
        tracing::info!(%email, bytes = pdf.len(), "exported pdf");
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lesson_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    use crate::error::GenerationError;

    struct Disabled;

    #[async_trait]
    impl TextGenerator for Disabled {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Disabled)
        }
    }

    fn service() -> LessonService {
        LessonService::new(
            fixed_clock(),
            Arc::new(InMemoryRepository::default()),
            Arc::new(Disabled),
        )
    }

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn everything_requires_an_upload() {
        let svc = service();
        let who = email("a@example.com");
        assert!(matches!(svc.summarize(&who).await, Err(LessonError::NoContent)));
        assert!(matches!(svc.generate_quiz(&who).await, Err(LessonError::NoContent)));
        assert!(matches!(svc.generate_flashcards(&who).await, Err(LessonError::NoContent)));
        assert!(matches!(svc.ask(&who, "why?").await, Err(LessonError::NoContent)));
        assert!(matches!(svc.export_pptx(&who).await, Err(LessonError::NoContent)));
        assert!(matches!(svc.export_pdf(&who).await, Err(LessonError::NoContent)));
    }

    #[tokio::test]
    async fn uploads_are_scoped_per_user() {
        let svc = service();
        svc.upload(&email("a@example.com"), "text/plain", b"Photosynthesis")
            .await
            .unwrap();
        assert!(svc.generate_quiz(&email("a@example.com")).await.is_ok());
        assert!(matches!(
            svc.generate_quiz(&email("b@example.com")).await,
            Err(LessonError::NoContent)
        ));
    }

    #[tokio::test]
    async fn upload_preview_is_truncated() {
        let svc = service();
        let long = "x".repeat(600);
        let preview = svc
            .upload(&email("a@example.com"), "text/plain; charset=utf-8", long.as_bytes())
            .await
            .unwrap();
        assert_eq!(preview.total_chars, 600);
        assert_eq!(preview.preview.len(), 503);
        assert!(preview.preview.ends_with("..."));
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected_and_not_stored() {
        let svc = service();
        let who = email("a@example.com");
        let err = svc.upload(&who, "image/png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, LessonError::Extraction(_)));
        assert!(matches!(svc.summarize(&who).await, Err(LessonError::NoContent)));
    }

    #[tokio::test]
    async fn malformed_pdf_upload_is_an_extraction_error() {
        let svc = service();
        let who = email("a@example.com");
        let err = svc
            .upload(&who, "application/pdf", b"%PDF-1.7\n\x00\xff garbage")
            .await
            .unwrap_err();
        assert!(matches!(err, LessonError::Extraction(ExtractionError::Pdf(_))));
        assert!(matches!(svc.summarize(&who).await, Err(LessonError::NoContent)));
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let svc = service();
        let who = email("a@example.com");
        svc.upload(&who, "text/plain", b"Cells").await.unwrap();
        assert!(matches!(svc.ask(&who, "   ").await, Err(LessonError::EmptyQuestion)));
        assert_eq!(
            svc.ask(&who, " What is a cell? ").await.unwrap(),
            "Mock answer: This is a simulated response for 'What is a cell?'."
        );
    }
}
