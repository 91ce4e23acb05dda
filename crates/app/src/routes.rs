use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use lesson_core::flashcards::FlashcardSet;
use lesson_core::quiz::QuizResult;
use lesson_core::summary::Summary;
use serde::{Deserialize, Serialize};
use services::AccessToken;
use services::extraction::{MIME_DOCX, MIME_PDF, MIME_PPTX};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub message: &'static str,
    pub user_id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub token: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub quiz: QuizResult,
}

#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub flashcards: FlashcardSet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
}

// ─── Accounts ───────────────────────────────────────────────────────────────

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "AI Lesson Converter API",
        status: "running",
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<RegisteredResponse>, ApiError> {
    let user_id = state.auth.register(&body.email, &body.password).await?;
    Ok(Json(RegisteredResponse {
        message: "User created successfully",
        user_id: user_id.value(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<AccessToken>, ApiError> {
    Ok(Json(state.auth.login(&body.email, &body.password).await?))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully. Please clear your token on the frontend.",
    })
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Json<MessageResponse> {
    if let Some(email) = body.email {
        if let Err(err) = state.auth.forgot_password(&email).await {
            tracing::error!(error = &err as &dyn std::error::Error, "password reset request failed");
        }
    }
    Json(MessageResponse {
        message: "If this email exists, a reset link has been sent.",
    })
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(email), Some(token), Some(new_password)) = (
        present(body.email),
        present(body.token),
        present(body.new_password),
    ) else {
        return Err(ApiError::BadRequest("Missing fields".into()));
    };

    state
        .auth
        .reset_password(&email, token.trim(), &new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successful",
    }))
}

// ─── Lessons ────────────────────────────────────────────────────────────────

/// Media type for an upload, falling back to the file extension when the
/// client sent none or a generic one.
fn upload_media_type(content_type: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(content_type) = content_type {
        if content_type != "application/octet-stream" {
            return content_type.to_string();
        }
    }
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => MIME_PDF,
        Some("docx") => MIME_DOCX,
        Some("pptx") => MIME_PPTX,
        Some("txt" | "md") => "text/plain",
        _ => content_type.unwrap_or("application/octet-stream"),
    }
    .to_string()
}

pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let bad_multipart = |err: axum::extract::multipart::MultipartError| {
        ApiError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("file") {
            continue;
        }
        let media_type = upload_media_type(field.content_type(), field.file_name());
        let data = field.bytes().await.map_err(bad_multipart)?;

        let preview = state.lessons.upload(&user.email, &media_type, &data).await?;
        return Ok(Json(UploadResponse {
            message: "File uploaded successfully",
            content: preview.preview,
        }));
    }
    Err(ApiError::BadRequest("No file uploaded".into()))
}

pub async fn summarize(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.lessons.summarize(&user.email).await?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = state.lessons.generate_quiz(&user.email).await?;
    tracing::info!(
        email = %user.email,
        synthetic = quiz.synthetic_count(),
        "quiz generated"
    );
    Ok(Json(QuizResponse { quiz }))
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let flashcards = state.lessons.generate_flashcards(&user.email).await?;
    Ok(Json(FlashcardsResponse { flashcards }))
}

pub async fn ask(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = state.lessons.ask(&user.email, &body.question).await?;
    Ok(Json(AskResponse {
        question: body.question,
        answer,
    }))
}

// ─── Exports ────────────────────────────────────────────────────────────────

fn attachment(media_type: &'static str, file_name: &'static str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, media_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn export_ppt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let deck = state.lessons.export_pptx(&user.email).await?;
    Ok(attachment(MIME_PPTX, "lesson.pptx", deck))
}

pub async fn export_pdf(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let pdf = state.lessons.export_pdf(&user.email).await?;
    Ok(attachment(MIME_PDF, "lesson.pdf", pdf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_prefers_specific_content_type() {
        assert_eq!(upload_media_type(Some("text/markdown"), Some("a.pdf")), "text/markdown");
        assert_eq!(upload_media_type(Some("application/octet-stream"), Some("Deck.PPTX")), MIME_PPTX);
        assert_eq!(upload_media_type(None, Some("notes.txt")), "text/plain");
        assert_eq!(upload_media_type(None, Some("photo.png")), "application/octet-stream");
        assert_eq!(upload_media_type(None, None), "application/octet-stream");
    }
}
