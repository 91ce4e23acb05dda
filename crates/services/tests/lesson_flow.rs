use std::sync::Arc;

use async_trait::async_trait;
use lesson_core::model::Email;
use lesson_core::time::fixed_now;
use services::extraction::{MIME_PPTX, extract_text};
use services::password::MIN_HASH_COST;
use services::{
    AuthConfig, AuthService, Clock, GenerationError, LessonError, LessonService, TextGenerator,
};
use storage::repository::Storage;

/// Replies in the formats the prompts ask for, with a few defects mixed in.
struct ScriptedGenerator;

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let reply = if prompt.starts_with("Create 5 bullet point summary") {
            "• Cells are the unit of life\n- Organelles have jobs\n\n* Membranes control traffic"
        } else if prompt.starts_with("Create 15 multiple choice") {
            "Q: What powers the cell?\nA) Mitochondria\nB) Ribosome\nC) Nucleus\nD) Golgi\nCorrect: A\n\
             Q: Broken question\nA) only one option\nCorrect: A\n\
             Q: Where is DNA stored?\nA) Membrane\nB) Nucleus\nC) Vacuole\nD) Wall\nCorrect: B\n"
        } else if prompt.starts_with("Create 10 flashcards") {
            "Term: Cell\nDefinition: Smallest unit of life\nTerm: Nucleus\nDefinition: Holds DNA"
        } else {
            "   "
        };
        Ok(reply.to_string())
    }
}

async fn setup(db: &str) -> (AuthService, LessonService) {
    let storage = Storage::sqlite(db).await.expect("connect sqlite");
    let clock = Clock::fixed(fixed_now());
    let auth = AuthService::new(
        clock,
        AuthConfig::default().with_hash_cost(MIN_HASH_COST),
        Arc::clone(&storage.users),
        Arc::clone(&storage.reset_tokens),
    );
    let lessons = LessonService::new(clock, Arc::clone(&storage.contents), Arc::new(ScriptedGenerator));
    (auth, lessons)
}

#[tokio::test]
async fn register_upload_and_study() {
    let (auth, lessons) = setup("sqlite:file:memdb_lesson_flow?mode=memory&cache=shared").await;

    auth.register("student@example.com", "hunter2").await.expect("register");
    let token = auth.login("student@example.com", "hunter2").await.expect("login");
    let user = auth.authenticate(&token.access_token).await.expect("authenticate");
    assert_eq!(user.email.as_str(), "student@example.com");

    let preview = lessons
        .upload(&user.email, "text/plain", b"Cells are the basic unit of life.")
        .await
        .expect("upload");
    assert_eq!(preview.preview, "Cells are the basic unit of life.");

    let summary = lessons.summarize(&user.email).await.expect("summary");
    assert!(!summary.is_synthetic());
    assert_eq!(summary.points()[0], "Cells are the unit of life");
    assert_eq!(summary.points().len(), 3);

    let quiz = lessons.generate_quiz(&user.email).await.expect("quiz");
    assert_eq!(quiz.len(), 15);
    assert_eq!(quiz.synthetic_count(), 13);
    assert_eq!(quiz.questions()[0].correct_answer(), "Mitochondria");
    assert_eq!(quiz.questions()[1].question(), "Where is DNA stored?");
    assert_eq!(quiz.questions()[1].correct_answer(), "Nucleus");
    assert_eq!(quiz.questions()[2].question(), "Generated Question 3");

    let cards = lessons.generate_flashcards(&user.email).await.expect("flashcards");
    assert_eq!(cards.cards().len(), 10);
    assert_eq!(cards.cards()[1].front(), "Nucleus");
    assert_eq!(cards.synthetic_count(), 8);

    let answer = lessons.ask(&user.email, "What is a cell?").await.expect("ask");
    assert_eq!(answer, "Mock answer: This is a simulated response for 'What is a cell?'.");
}

#[tokio::test]
async fn exported_deck_contains_parsed_quiz() {
    let (_, lessons) = setup("sqlite:file:memdb_lesson_export?mode=memory&cache=shared").await;
    let who = Email::parse("tutor@example.com").expect("email");

    lessons
        .upload(&who, "text/markdown", b"# Cells")
        .await
        .expect("upload");

    let deck = lessons.export_pptx(&who).await.expect("pptx");
    let text = extract_text(MIME_PPTX, &deck).expect("read back deck");
    assert!(text.starts_with("AI Lesson Converter\nGenerated Lesson Summary & Quiz\n"));
    assert!(text.contains("1. Cells are the unit of life\n"));
    assert!(text.contains("Q1: What powers the cell?\n  A) Mitochondria\n"));
    assert!(text.contains("Q15: Generated Question 15\n"));

    let pdf = lessons.export_pdf(&who).await.expect("pdf");
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn export_without_upload_fails() {
    let (_, lessons) = setup("sqlite:file:memdb_lesson_empty?mode=memory&cache=shared").await;
    let who = Email::parse("nobody@example.com").expect("email");
    assert!(matches!(lessons.export_pdf(&who).await, Err(LessonError::NoContent)));
}
