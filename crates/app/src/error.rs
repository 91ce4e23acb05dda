use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use services::{AuthError, LessonError};
use thiserror::Error;

/// Handler failure rendered as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(err) => match err {
                AuthError::EmailTaken
                | AuthError::EmptyPassword
                | AuthError::Email(_)
                | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Lesson(err) => match err {
                LessonError::NoContent | LessonError::EmptyQuestion | LessonError::Extraction(_) => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = &self as &dyn std::error::Error, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::ExtractionError;

    #[test]
    fn maps_service_errors_to_status() {
        assert_eq!(ApiError::from(AuthError::EmailTaken).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AuthError::InvalidToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(LessonError::NoContent).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(LessonError::Extraction(ExtractionError::UnsupportedType(
                "image/png".into()
            )))
            .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unauthorized_carries_challenge_header() {
        let response = ApiError::Unauthorized("Not authenticated").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
